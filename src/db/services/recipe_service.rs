use sea_orm::prelude::Decimal;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag};
use crate::db::services::{get_or_create_ingredient, get_or_create_tag};

/// Everything needed to insert a recipe. Label names are already validated.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tag_names: Vec<String>,
    pub ingredient_names: Vec<String>,
}

/// A recipe with its tags and ingredients, both sorted by name.
#[derive(Debug, Clone)]
pub struct RecipeWithLabels {
    pub recipe: recipe::Model,
    pub tags: Vec<tag::Model>,
    pub ingredients: Vec<ingredient::Model>,
}

/// Inserts the recipe and links it to the user's tags and ingredients,
/// creating any that do not exist yet. Runs as one transaction.
pub async fn create_recipe(
    db: &DatabaseConnection,
    user_id: i32,
    new_recipe: NewRecipe,
) -> Result<RecipeWithLabels, DbErr> {
    let txn = db.begin().await?;

    let recipe = recipe::ActiveModel {
        user_id: Set(user_id),
        title: Set(new_recipe.title),
        description: Set(new_recipe.description),
        time_minutes: Set(new_recipe.time_minutes),
        price: Set(new_recipe.price),
        link: Set(new_recipe.link),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut tags: Vec<tag::Model> = Vec::new();
    for name in &new_recipe.tag_names {
        let tag = get_or_create_tag(&txn, user_id, name).await?;
        if tags.iter().all(|t| t.id != tag.id) {
            tags.push(tag);
        }
    }
    if !tags.is_empty() {
        recipe_tag::Entity::insert_many(tags.iter().map(|t| recipe_tag::ActiveModel {
            recipe_id: Set(recipe.id),
            tag_id: Set(t.id),
        }))
        .exec_without_returning(&txn)
        .await?;
    }

    let mut ingredients: Vec<ingredient::Model> = Vec::new();
    for name in &new_recipe.ingredient_names {
        let ingredient = get_or_create_ingredient(&txn, user_id, name).await?;
        if ingredients.iter().all(|i| i.id != ingredient.id) {
            ingredients.push(ingredient);
        }
    }
    if !ingredients.is_empty() {
        recipe_ingredient::Entity::insert_many(ingredients.iter().map(|i| {
            recipe_ingredient::ActiveModel {
                recipe_id: Set(recipe.id),
                ingredient_id: Set(i.id),
            }
        }))
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;

    tags.sort_by(|a, b| a.name.cmp(&b.name));
    ingredients.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(RecipeWithLabels {
        recipe,
        tags,
        ingredients,
    })
}

/// Lists the user's recipes, newest first. A non-empty `tag_ids` keeps
/// recipes linked to any of those tags; `ingredient_ids` likewise. Both
/// filters are sub-selects, so each recipe is returned at most once.
pub async fn get_recipes_for_user(
    db: &DatabaseConnection,
    user_id: i32,
    tag_ids: &[i32],
    ingredient_ids: &[i32],
) -> Result<Vec<RecipeWithLabels>, DbErr> {
    let mut query = recipe::Entity::find().filter(recipe::Column::UserId.eq(user_id));

    if !tag_ids.is_empty() {
        query = query.filter(
            recipe::Column::Id.in_subquery(
                Query::select()
                    .column(recipe_tag::Column::RecipeId)
                    .from(recipe_tag::Entity)
                    .and_where(recipe_tag::Column::TagId.is_in(tag_ids.iter().copied()))
                    .to_owned(),
            ),
        );
    }
    if !ingredient_ids.is_empty() {
        query = query.filter(
            recipe::Column::Id.in_subquery(
                Query::select()
                    .column(recipe_ingredient::Column::RecipeId)
                    .from(recipe_ingredient::Entity)
                    .and_where(
                        recipe_ingredient::Column::IngredientId.is_in(ingredient_ids.iter().copied()),
                    )
                    .to_owned(),
            ),
        );
    }

    let recipes = query.order_by_desc(recipe::Column::Id).all(db).await?;
    attach_labels(db, recipes).await
}

pub async fn find_recipe_owned_by_user(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> Result<Option<RecipeWithLabels>, DbErr> {
    let Some(recipe) = recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    Ok(attach_labels(db, vec![recipe]).await?.pop())
}

async fn attach_labels(
    db: &DatabaseConnection,
    recipes: Vec<recipe::Model>,
) -> Result<Vec<RecipeWithLabels>, DbErr> {
    let tags = recipes
        .load_many_to_many(tag::Entity, recipe_tag::Entity, db)
        .await?;
    let ingredients = recipes
        .load_many_to_many(ingredient::Entity, recipe_ingredient::Entity, db)
        .await?;

    Ok(recipes
        .into_iter()
        .zip(tags)
        .zip(ingredients)
        .map(|((recipe, mut tags), mut ingredients)| {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
            ingredients.sort_by(|a, b| a.name.cmp(&b.name));
            RecipeWithLabels {
                recipe,
                tags,
                ingredients,
            }
        })
        .collect())
}
