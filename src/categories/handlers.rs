use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::auth::extractors::AuthUser;
use crate::categories::dto::{CategoriesEnvelope, CategoryRequest, CategoryResponse};
use crate::categories::repo;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation;

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CategoriesEnvelope>, ApiError> {
    let categories = repo::list_by_user(&state.db, user.0.user_id).await?;
    Ok(Json(CategoriesEnvelope {
        categories: categories.iter().map(CategoryResponse::from).collect(),
    }))
}

#[instrument(skip(state, user, body), fields(user_id = %user.0.user_id))]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let payload: CategoryRequest = validation::decode(body)?;
    let name = payload.validated()?;
    let category = repo::create(&state.db, user.0.user_id, &name).await?;
    info!(category_id = %category.category_id, "category created");
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(&category))))
}

#[instrument(skip(state, user, body), fields(user_id = %user.0.user_id))]
pub async fn edit_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(category_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category_id = validation::parse_resource_id(&category_id)?;
    let payload: CategoryRequest = validation::decode(body)?;
    let name = payload.validated()?;
    let category = repo::rename(&state.db, user.0.user_id, category_id, &name)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(CategoryResponse::from(&category)))
}

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(category_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let category_id = validation::parse_resource_id(&category_id)?;
    if !repo::delete(&state.db, user.0.user_id, category_id).await? {
        return Err(ApiError::NotFound);
    }
    info!(%category_id, "category deleted");
    Ok(Json(json!({ "status": 200 })))
}
