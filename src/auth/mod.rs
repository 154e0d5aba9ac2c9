use axum::{routing::get, Router};

use crate::state::AppState;

pub mod extractors;
pub mod handlers;
pub mod password;
pub mod token;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(handlers::login))
        .route("/logout", get(handlers::logout))
}
