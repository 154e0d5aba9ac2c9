use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::auth::extractors::{AuthUser, BasicUser};
use crate::auth::token;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// GET /login — Basic credentials in, bearer token out.
#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn login(
    State(state): State<AppState>,
    user: BasicUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let BasicUser(user) = user;
    let token = token::issue(&state.db, &user, state.config.token_ttl_seconds).await?;
    info!(user_id = %user.user_id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

/// GET /logout — expires the presented token immediately.
#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let AuthUser(user) = user;
    token::revoke(&state.db, user.user_id).await?;
    info!(user_id = %user.user_id, "user logged out");
    Ok(Json(json!({ "status": 200 })))
}
