use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;
use tracing::info;

use crate::db::services;
use crate::web::models::{
    AuthenticatedUser, CreateLabelRequest, LabelListQuery, LabelResponse, UpdateLabelRequest,
    validate_name,
};
use crate::web::{AppError, AppState};

const INGREDIENT_NOT_FOUND: &str = "Ingredient not found.";

async fn get_user_ingredients_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    filter: Result<Query<LabelListQuery>, QueryRejection>,
) -> Result<Json<Vec<LabelResponse>>, AppError> {
    let Query(filter) = filter?;
    let assigned_only = filter.assigned_only()?;
    let ingredients =
        services::get_ingredients_for_user(&app_state.db_pool, authenticated_user.id, assigned_only)
            .await?;
    Ok(Json(ingredients.into_iter().map(LabelResponse::from).collect()))
}

async fn create_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateLabelRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LabelResponse>), AppError> {
    let Json(payload) = payload?;
    let name = validate_name(&payload.name)?;

    let ingredient =
        services::create_ingredient(&app_state.db_pool, authenticated_user.id, &name).await?;
    info!(user_id = authenticated_user.id, ingredient_id = ingredient.id, "Created ingredient.");
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

async fn get_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(ingredient_id): Path<i32>,
) -> Result<Json<LabelResponse>, AppError> {
    let ingredient = services::find_ingredient_owned_by_user(
        &app_state.db_pool,
        ingredient_id,
        authenticated_user.id,
    )
    .await?
    .ok_or_else(|| AppError::NotFound(INGREDIENT_NOT_FOUND.to_string()))?;
    Ok(Json(ingredient.into()))
}

async fn update_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(ingredient_id): Path<i32>,
    payload: Result<Json<UpdateLabelRequest>, JsonRejection>,
) -> Result<Json<LabelResponse>, AppError> {
    let Json(payload) = payload?;
    let name = payload.name.as_deref().map(validate_name).transpose()?;

    let ingredient = services::update_ingredient(
        &app_state.db_pool,
        ingredient_id,
        authenticated_user.id,
        name.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound(INGREDIENT_NOT_FOUND.to_string()))?;
    Ok(Json(ingredient.into()))
}

async fn delete_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(ingredient_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if services::delete_ingredient(&app_state.db_pool, ingredient_id, authenticated_user.id).await? {
        info!(user_id = authenticated_user.id, ingredient_id, "Deleted ingredient.");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(INGREDIENT_NOT_FOUND.to_string()))
    }
}

pub fn create_ingredients_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(get_user_ingredients_handler).post(create_ingredient_handler),
        )
        .route(
            "/{ingredient_id}",
            get(get_ingredient_handler)
                .patch(update_ingredient_handler)
                .delete(delete_ingredient_handler),
        )
}
