use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::entities::{ingredient, recipe_ingredient};

// --- Ingredient Service Functions ---

/// Same contract as [`super::get_tags_for_user`], over `recipe_ingredients`.
pub async fn get_ingredients_for_user(
    db: &DatabaseConnection,
    user_id: i32,
    assigned_only: bool,
) -> Result<Vec<ingredient::Model>, DbErr> {
    let mut query = ingredient::Entity::find().filter(ingredient::Column::UserId.eq(user_id));

    if assigned_only {
        query = query.filter(
            ingredient::Column::Id.in_subquery(
                Query::select()
                    .column(recipe_ingredient::Column::IngredientId)
                    .from(recipe_ingredient::Entity)
                    .to_owned(),
            ),
        );
    }

    query
        .order_by_desc(ingredient::Column::Name)
        .order_by_desc(ingredient::Column::Id)
        .all(db)
        .await
}

pub async fn create_ingredient<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
) -> Result<ingredient::Model, DbErr> {
    ingredient::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn find_ingredient_owned_by_user<C: ConnectionTrait>(
    db: &C,
    ingredient_id: i32,
    user_id: i32,
) -> Result<Option<ingredient::Model>, DbErr> {
    ingredient::Entity::find_by_id(ingredient_id)
        .filter(ingredient::Column::UserId.eq(user_id))
        .one(db)
        .await
}

pub async fn get_or_create_ingredient<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
) -> Result<ingredient::Model, DbErr> {
    let existing = ingredient::Entity::find()
        .filter(ingredient::Column::UserId.eq(user_id))
        .filter(ingredient::Column::Name.eq(name))
        .one(db)
        .await?;

    match existing {
        Some(ingredient) => Ok(ingredient),
        None => create_ingredient(db, user_id, name).await,
    }
}

pub async fn update_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i32,
    user_id: i32,
    name: Option<&str>,
) -> Result<Option<ingredient::Model>, DbErr> {
    let Some(existing) = find_ingredient_owned_by_user(db, ingredient_id, user_id).await? else {
        return Ok(None);
    };
    let Some(name) = name else {
        return Ok(Some(existing));
    };

    let mut active: ingredient::ActiveModel = existing.into();
    active.name = Set(name.to_string());
    match active.update(db).await {
        Ok(updated) => Ok(Some(updated)),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn delete_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i32,
    user_id: i32,
) -> Result<bool, DbErr> {
    let txn = db.begin().await?;

    let Some(existing) = find_ingredient_owned_by_user(&txn, ingredient_id, user_id).await? else {
        txn.rollback().await?;
        return Ok(false);
    };

    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::IngredientId.eq(existing.id))
        .exec(&txn)
        .await?;
    ingredient::Entity::delete_by_id(existing.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(true)
}
