use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{RegisterRequest, UserPatch, UserResponse};
use crate::users::repo::{self, User};
use crate::validation;

/// POST /register — the only unauthenticated mutation.
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let payload: RegisterRequest = validation::decode(body)?;
    let registration = payload.validated()?;

    // Check-then-insert; a racing duplicate still surfaces as 409 through the
    // unique-violation mapping.
    if repo::username_or_email_taken(
        &state.db,
        &registration.username,
        registration.email.as_deref(),
    )
    .await?
    {
        return Err(ApiError::Conflict);
    }

    let password_hash = hash_password(&registration.password)?;
    let user = User {
        user_id: Uuid::new_v4(),
        username: registration.username,
        email: registration.email,
        password_hash,
        first_name: registration.first_name,
        last_name: registration.last_name,
        birth_date: registration.birth_date,
        token: None,
        token_expiration: None,
    };
    let user = repo::create(&state.db, &user).await?;

    info!(user_id = %user.user_id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /user — own profile.
#[instrument(skip(user), fields(user_id = %user.0.user_id))]
pub async fn get_user(user: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user.0))
}

/// PUT /user — partial profile edit; username/email collisions map to 409.
#[instrument(skip(state, user, body), fields(user_id = %user.0.user_id))]
pub async fn edit_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<Value>,
) -> Result<Json<UserResponse>, ApiError> {
    let AuthUser(mut user) = user;
    let patch: UserPatch = validation::decode(body)?;
    patch.apply_to(&mut user)?;
    if let Some(password) = &patch.password {
        user.password_hash = hash_password(password)?;
    }
    let user = repo::update_profile(&state.db, &user).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /user — removes the account and everything it owns.
#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let AuthUser(user) = user;
    repo::delete(&state.db, user.user_id).await?;
    info!(user_id = %user.user_id, "user deleted");
    Ok(Json(json!({ "status": 200 })))
}
