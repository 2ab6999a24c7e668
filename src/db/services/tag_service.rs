use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::entities::{recipe_tag, tag};

// --- Tag Service Functions ---

/// Retrieves the tags owned by `user_id`, newest name first.
///
/// With `assigned_only`, a tag is kept only when at least one row in
/// `recipe_tags` points at it. The check is a sub-select on the junction
/// table, so a tag linked to several recipes still appears once.
pub async fn get_tags_for_user(
    db: &DatabaseConnection,
    user_id: i32,
    assigned_only: bool,
) -> Result<Vec<tag::Model>, DbErr> {
    let mut query = tag::Entity::find().filter(tag::Column::UserId.eq(user_id));

    if assigned_only {
        query = query.filter(
            tag::Column::Id.in_subquery(
                Query::select()
                    .column(recipe_tag::Column::TagId)
                    .from(recipe_tag::Entity)
                    .to_owned(),
            ),
        );
    }

    query
        .order_by_desc(tag::Column::Name)
        .order_by_desc(tag::Column::Id)
        .all(db)
        .await
}

/// Creates a new tag for a user.
pub async fn create_tag<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
) -> Result<tag::Model, DbErr> {
    tag::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Finds a tag by id, but only if `user_id` owns it.
pub async fn find_tag_owned_by_user<C: ConnectionTrait>(
    db: &C,
    tag_id: i32,
    user_id: i32,
) -> Result<Option<tag::Model>, DbErr> {
    tag::Entity::find_by_id(tag_id)
        .filter(tag::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Returns the caller's tag with exactly this name, creating it if missing.
pub async fn get_or_create_tag<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
) -> Result<tag::Model, DbErr> {
    let existing = tag::Entity::find()
        .filter(tag::Column::UserId.eq(user_id))
        .filter(tag::Column::Name.eq(name))
        .one(db)
        .await?;

    match existing {
        Some(tag) => Ok(tag),
        None => create_tag(db, user_id, name).await,
    }
}

/// Applies a partial update. `Ok(None)` means no tag with that id belongs to the user.
pub async fn update_tag(
    db: &DatabaseConnection,
    tag_id: i32,
    user_id: i32,
    name: Option<&str>,
) -> Result<Option<tag::Model>, DbErr> {
    let Some(existing) = find_tag_owned_by_user(db, tag_id, user_id).await? else {
        return Ok(None);
    };
    let Some(name) = name else {
        return Ok(Some(existing));
    };

    let mut active: tag::ActiveModel = existing.into();
    active.name = Set(name.to_string());
    match active.update(db).await {
        Ok(updated) => Ok(Some(updated)),
        // Deleted between the lookup and the update.
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Deletes a tag together with its recipe links in one transaction.
/// Returns `false` when the user owns no such tag.
pub async fn delete_tag(db: &DatabaseConnection, tag_id: i32, user_id: i32) -> Result<bool, DbErr> {
    let txn = db.begin().await?;

    let Some(existing) = find_tag_owned_by_user(&txn, tag_id, user_id).await? else {
        txn.rollback().await?;
        return Ok(false);
    };

    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::TagId.eq(existing.id))
        .exec(&txn)
        .await?;
    tag::Entity::delete_by_id(existing.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(true)
}
