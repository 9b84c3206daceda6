//! Expense routes.

use axum::extract::{Query, State};
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::Json;
use models::{Expense, MessageResponse};
use serde::Deserialize;

use super::auth::AuthUser;
use super::{ApiJson, ApiPath};
use crate::error::ApiError;
use crate::services::ledger;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category_id: Option<i64>,
}

/// `GET /api/expenses?category_id=`
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(ledger::list_expenses(state.store.as_ref(), auth.scope(), query.category_id).await?))
}

/// `POST /api/expenses`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<ledger::ExpenseInput>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = ledger::create_expense(state.store.as_ref(), auth.scope(), input).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// `GET /api/expenses/{id}`
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Expense>, ApiError> {
    Ok(Json(ledger::show_expense(state.store.as_ref(), auth.scope(), id).await?))
}

/// `PUT /api/expenses/{id}`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ledger::ExpenseInput>,
) -> Result<Json<Expense>, ApiError> {
    Ok(Json(ledger::update_expense(state.store.as_ref(), auth.scope(), id, input).await?))
}

/// `DELETE /api/expenses/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    ledger::delete_expense(state.store.as_ref(), auth.scope(), id).await?;
    Ok(Json(MessageResponse::new("Expense deleted successfully.")))
}

#[cfg(test)]
#[path = "expenses_test.rs"]
mod tests;
