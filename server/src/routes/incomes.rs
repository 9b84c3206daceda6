//! Income routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use models::{Income, MessageResponse};

use super::auth::AuthUser;
use super::{ApiJson, ApiPath};
use crate::error::ApiError;
use crate::services::ledger;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<Income>>, ApiError> {
    Ok(Json(ledger::list_incomes(state.store.as_ref(), auth.scope()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<ledger::IncomeInput>,
) -> Result<(StatusCode, Json<Income>), ApiError> {
    let income = ledger::create_income(state.store.as_ref(), auth.scope(), input).await?;
    Ok((StatusCode::CREATED, Json(income)))
}

pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Income>, ApiError> {
    Ok(Json(ledger::show_income(state.store.as_ref(), auth.scope(), id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ledger::IncomeInput>,
) -> Result<Json<Income>, ApiError> {
    Ok(Json(ledger::update_income(state.store.as_ref(), auth.scope(), id, input).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    ledger::delete_income(state.store.as_ref(), auth.scope(), id).await?;
    Ok(Json(MessageResponse::new("Income deleted successfully.")))
}

#[cfg(test)]
#[path = "incomes_test.rs"]
mod tests;
