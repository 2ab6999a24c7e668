use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use sea_orm::prelude::Decimal;
use std::sync::Arc;
use tracing::info;

use crate::db::services::{self, NewRecipe};
use crate::web::models::{
    AuthenticatedUser, CreateRecipeRequest, RecipeListQuery, RecipeResponse, validate_name,
};
use crate::web::{AppError, AppState};

const MAX_TITLE_LEN: usize = 255;
/// Upper bound (exclusive) of a `Decimal(5, 2)` price column.
const PRICE_LIMIT: i64 = 1000;

fn validate_recipe(payload: CreateRecipeRequest) -> Result<NewRecipe, AppError> {
    let title = payload.title.trim().to_string();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(format!(
            "title: must be between 1 and {MAX_TITLE_LEN} characters"
        )));
    }
    if payload.time_minutes < 0 {
        return Err(AppError::InvalidInput("time_minutes: may not be negative".to_string()));
    }
    if payload.price.is_sign_negative()
        || payload.price.normalize().scale() > 2
        || payload.price >= Decimal::from(PRICE_LIMIT)
    {
        return Err(AppError::InvalidInput(format!(
            "price: must be a non-negative amount below {PRICE_LIMIT} with at most 2 decimal places"
        )));
    }

    let tag_names = payload
        .tags
        .iter()
        .map(|t| validate_name(&t.name))
        .collect::<Result<Vec<_>, _>>()?;
    let ingredient_names = payload
        .ingredients
        .iter()
        .map(|i| validate_name(&i.name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewRecipe {
        title,
        description: payload.description,
        time_minutes: payload.time_minutes,
        price: payload.price,
        link: payload.link,
        tag_names,
        ingredient_names,
    })
}

async fn get_user_recipes_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    filter: Result<Query<RecipeListQuery>, QueryRejection>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let Query(filter) = filter?;
    let tag_ids = filter.tag_ids()?;
    let ingredient_ids = filter.ingredient_ids()?;

    let recipes = services::get_recipes_for_user(
        &app_state.db_pool,
        authenticated_user.id,
        &tag_ids,
        &ingredient_ids,
    )
    .await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

async fn create_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeResponse>), AppError> {
    let Json(payload) = payload?;
    let new_recipe = validate_recipe(payload)?;

    let created =
        services::create_recipe(&app_state.db_pool, authenticated_user.id, new_recipe).await?;
    info!(
        user_id = authenticated_user.id,
        recipe_id = created.recipe.id,
        tags = created.tags.len(),
        ingredients = created.ingredients.len(),
        "Created recipe."
    );
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe =
        services::find_recipe_owned_by_user(&app_state.db_pool, recipe_id, authenticated_user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipe not found.".to_string()))?;
    Ok(Json(recipe.into()))
}

pub fn create_recipes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_user_recipes_handler).post(create_recipe_handler))
        .route("/{recipe_id}", get(get_recipe_handler))
}
