use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::categories::repo as categories;
use crate::error::ApiError;
use crate::expenses::dto::{
    CreateExpenseRequest, ExpensePatch, ExpenseResponse, ExpensesEnvelope,
};
use crate::expenses::filter::{ExpenseFilter, ExpenseQuery};
use crate::expenses::repo::{self, ExpenseRecord};
use crate::state::AppState;
use crate::validation;

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn list_expenses(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<ExpensesEnvelope>, ApiError> {
    let mut filter = ExpenseFilter::from_query(&query)?;

    if let Some(name) = &query.category {
        // A name that matches no category anywhere filters everything out.
        match categories::find_any_by_name(&state.db, name).await? {
            Some(category) => filter.category_id = Some(category.category_id),
            None => return Ok(Json(ExpensesEnvelope { expenses: vec![] })),
        }
    }

    let expenses = repo::list(&state.db, user.0.user_id, &filter).await?;
    Ok(Json(ExpensesEnvelope {
        expenses: expenses.iter().map(ExpenseResponse::from).collect(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn get_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(expense_id): Path<String>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let expense_id = validation::parse_resource_id(&expense_id)?;
    let expense = repo::fetch(&state.db, user.0.user_id, expense_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(ExpenseResponse::from(&expense)))
}

#[instrument(skip(state, user, body), fields(user_id = %user.0.user_id))]
pub async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let AuthUser(user) = user;
    let payload: CreateExpenseRequest = validation::decode(body)?;
    let expense = payload.validated()?;

    let category_id = match &expense.category {
        Some(name) => Some(
            categories::get_or_create(&state.db, user.user_id, name)
                .await?
                .category_id,
        ),
        None => None,
    };

    let record = ExpenseRecord {
        expense_id: Uuid::new_v4(),
        cost: expense.cost,
        date: expense.date,
        description: expense.description,
        user_id: user.user_id,
        category_id,
    };
    repo::insert(&state.db, &record).await?;

    let view = repo::fetch(&state.db, user.user_id, record.expense_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(expense_id = %record.expense_id, "expense created");
    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(&view))))
}

#[instrument(skip(state, user, body), fields(user_id = %user.0.user_id))]
pub async fn edit_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(expense_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let AuthUser(user) = user;
    let expense_id = validation::parse_resource_id(&expense_id)?;
    let mut record = repo::find_record(&state.db, user.user_id, expense_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // Fully validate the patch before resolving the category, so a 400
    // never leaves an auto-created category behind.
    let patch: ExpensePatch = validation::decode(body)?;
    let patch = patch.validated()?;

    let category_link = match &patch.category {
        None => None,
        Some(None) => Some(None),
        Some(Some(name)) => Some(Some(
            categories::get_or_create(&state.db, user.user_id, name)
                .await?
                .category_id,
        )),
    };
    patch.apply_to(&mut record, category_link);
    repo::save(&state.db, &record).await?;

    let view = repo::fetch(&state.db, user.user_id, expense_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(ExpenseResponse::from(&view)))
}

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn delete_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(expense_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let expense_id = validation::parse_resource_id(&expense_id)?;
    if !repo::delete(&state.db, user.0.user_id, expense_id).await? {
        return Err(ApiError::NotFound);
    }
    info!(%expense_id, "expense deleted");
    Ok(Json(json!({ "status": 200 })))
}
