use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route(
            "/user",
            get(handlers::get_user)
                .put(handlers::edit_user)
                .delete(handlers::delete_user),
        )
}
