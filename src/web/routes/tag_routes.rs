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

const TAG_NOT_FOUND: &str = "Tag not found.";

// --- Route Handlers ---

async fn get_user_tags_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    filter: Result<Query<LabelListQuery>, QueryRejection>,
) -> Result<Json<Vec<LabelResponse>>, AppError> {
    let Query(filter) = filter?;
    let assigned_only = filter.assigned_only()?;
    let tags =
        services::get_tags_for_user(&app_state.db_pool, authenticated_user.id, assigned_only).await?;
    Ok(Json(tags.into_iter().map(LabelResponse::from).collect()))
}

async fn create_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateLabelRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LabelResponse>), AppError> {
    let Json(payload) = payload?;
    let name = validate_name(&payload.name)?;

    let tag = services::create_tag(&app_state.db_pool, authenticated_user.id, &name).await?;
    info!(user_id = authenticated_user.id, tag_id = tag.id, "Created tag.");
    Ok((StatusCode::CREATED, Json(tag.into())))
}

async fn get_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<Json<LabelResponse>, AppError> {
    let tag = services::find_tag_owned_by_user(&app_state.db_pool, tag_id, authenticated_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(TAG_NOT_FOUND.to_string()))?;
    Ok(Json(tag.into()))
}

async fn update_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
    payload: Result<Json<UpdateLabelRequest>, JsonRejection>,
) -> Result<Json<LabelResponse>, AppError> {
    let Json(payload) = payload?;
    let name = payload.name.as_deref().map(validate_name).transpose()?;

    let tag = services::update_tag(
        &app_state.db_pool,
        tag_id,
        authenticated_user.id,
        name.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound(TAG_NOT_FOUND.to_string()))?;
    Ok(Json(tag.into()))
}

async fn delete_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if services::delete_tag(&app_state.db_pool, tag_id, authenticated_user.id).await? {
        info!(user_id = authenticated_user.id, tag_id, "Deleted tag.");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(TAG_NOT_FOUND.to_string()))
    }
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_user_tags_handler).post(create_tag_handler))
        .route(
            "/{tag_id}",
            get(get_tag_handler)
                .patch(update_tag_handler)
                .delete(delete_tag_handler),
        )
}
