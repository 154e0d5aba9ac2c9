use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64ct::{Base64, Encoding};
use tracing::warn;

use crate::auth::{password::verify_password, token};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::{self, User};

/// Bearer-scheme identity: the resolved user is the sole source of ownership
/// scoping for everything the handler does afterwards.
pub struct AuthUser(pub User);

/// Basic-scheme identity; only the login endpoint accepts it.
pub struct BasicUser(pub User);

fn auth_header<'a>(parts: &'a Parts) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized("Missing Authorization header"))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = auth_header(parts)?;
        let bearer = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid Authorization header"))?;

        match token::resolve(&state.db, bearer).await? {
            Some(user) => Ok(AuthUser(user)),
            None => {
                warn!("invalid or expired token");
                Err(ApiError::Unauthorized("Invalid or expired token"))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for BasicUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = auth_header(parts)?;
        let encoded = header
            .strip_prefix("Basic ")
            .ok_or(ApiError::Unauthorized("Invalid Authorization header"))?;

        let (username, password) = decode_basic(encoded)
            .ok_or(ApiError::Unauthorized("Invalid Authorization header"))?;

        let Some(user) = repo::find_by_username(&state.db, &username).await? else {
            warn!(%username, "basic auth failed");
            return Err(ApiError::Unauthorized("Invalid credentials"));
        };
        // An unreadable stored hash is our fault, not a failed login.
        if !verify_password(&password, &user.password_hash)? {
            warn!(%username, "basic auth failed");
            return Err(ApiError::Unauthorized("Invalid credentials"));
        }
        Ok(BasicUser(user))
    }
}

fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let decoded = Base64::decode_vec(encoded).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_basic_credentials() {
        // "sjobs:x"
        let encoded = Base64::encode_string(b"sjobs:x");
        let (username, password) = decode_basic(&encoded).expect("valid credentials");
        assert_eq!(username, "sjobs");
        assert_eq!(password, "x");
    }

    #[test]
    fn password_may_contain_colons() {
        let encoded = Base64::encode_string(b"sjobs:a:b:c");
        let (_, password) = decode_basic(&encoded).expect("valid credentials");
        assert_eq!(password, "a:b:c");
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_basic("not base64!!").is_none());
        let no_colon = Base64::encode_string(b"sjobs");
        assert!(decode_basic(&no_colon).is_none());
    }

    #[test]
    fn malformed_stored_hash_is_a_server_error() {
        let err: ApiError = verify_password("x", "not-a-valid-hash").unwrap_err().into();
        assert_eq!(
            err.status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
