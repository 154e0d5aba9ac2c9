use axum::{routing::get, Router};

use crate::state::AppState;

pub mod dto;
pub mod filter;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/user/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/user/expenses/:expense_id",
            get(handlers::get_expense)
                .put(handlers::edit_expense)
                .delete(handlers::delete_expense),
        )
}
