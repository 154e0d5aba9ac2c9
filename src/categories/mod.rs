use axum::{routing::get, Router};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/user/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/user/categories/:category_id",
            axum::routing::put(handlers::edit_category).delete(handlers::delete_category),
        )
}
