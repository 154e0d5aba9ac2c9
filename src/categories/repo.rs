use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub category_id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT category_id, name, user_id FROM categories \
         WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_by_name(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT category_id, name, user_id FROM categories \
         WHERE user_id = $1 AND name = $2 LIMIT 1",
    )
    .bind(user_id)
    .bind(name)
    .fetch_optional(db)
    .await
}

/// Name lookup across all owners; the expense filter short-circuits to an
/// empty result when this finds nothing.
pub async fn find_any_by_name(db: &PgPool, name: &str) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT category_id, name, user_id FROM categories WHERE name = $1 LIMIT 1",
    )
    .bind(name)
    .fetch_optional(db)
    .await
}

pub async fn create(db: &PgPool, user_id: Uuid, name: &str) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (category_id, name, user_id) VALUES ($1, $2, $3) \
         RETURNING category_id, name, user_id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(user_id)
    .fetch_one(db)
    .await
}

/// Resolves a category name for an expense write, creating the category when
/// the owner has none with that name. Name uniqueness per owner is by this
/// read-then-write convention only; two concurrent requests can still create
/// duplicates.
pub async fn get_or_create(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
) -> Result<Category, sqlx::Error> {
    match find_by_name(db, user_id, name).await? {
        Some(category) => Ok(category),
        None => create(db, user_id, name).await,
    }
}

pub async fn rename(
    db: &PgPool,
    user_id: Uuid,
    category_id: Uuid,
    name: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $3 WHERE category_id = $1 AND user_id = $2 \
         RETURNING category_id, name, user_id",
    )
    .bind(category_id)
    .bind(user_id)
    .bind(name)
    .fetch_optional(db)
    .await
}

/// Clears every expense reference to the category, then removes it, in one
/// transaction: no caller can observe an expense pointing at a deleted
/// category. The clearing spans all owners, matching the user-delete cascade.
pub async fn delete(db: &PgPool, user_id: Uuid, category_id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;

    let owned: Option<(Uuid,)> =
        sqlx::query_as("SELECT category_id FROM categories WHERE category_id = $1 AND user_id = $2")
            .bind(category_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    if owned.is_none() {
        return Ok(false);
    }

    sqlx::query("UPDATE expenses SET category_id = NULL WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM categories WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
