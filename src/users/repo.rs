use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record as stored. The password hash and token fields never leave the
/// server; the public projection lives in `dto::UserResponse`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<Date>,
    pub token: Option<String>,
    pub token_expiration: Option<OffsetDateTime>,
}

const USER_COLUMNS: &str = "user_id, username, email, password_hash, first_name, last_name, \
                            birth_date, token, token_expiration";

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(db)
    .await
}

pub async fn find_by_token(db: &PgPool, token: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE token = $1"))
        .bind(token)
        .fetch_optional(db)
        .await
}

/// Pre-insert collision check on the natural keys. `email = NULL` never
/// matches, so a registration without an email only checks the username.
pub async fn username_or_email_taken(
    db: &PgPool,
    username: &str,
    email: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT user_id FROM users WHERE username = $1 OR email = $2")
            .bind(username)
            .bind(email)
            .fetch_optional(db)
            .await?;
    Ok(row.is_some())
}

pub async fn create(db: &PgPool, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (user_id, username, email, password_hash, first_name, last_name, birth_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user.user_id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.birth_date)
    .fetch_one(db)
    .await
}

/// Writes back every profile column of an already-merged record.
pub async fn update_profile(db: &PgPool, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET username = $2, email = $3, password_hash = $4, first_name = $5, \
         last_name = $6, birth_date = $7 \
         WHERE user_id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user.user_id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.birth_date)
    .fetch_one(db)
    .await
}

/// Removes the user; owned categories and expenses go with it through the
/// store's cascade rules, and references from any surviving expense are
/// nulled out.
pub async fn delete(db: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}
