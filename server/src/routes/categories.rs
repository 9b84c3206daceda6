//! Category routes. Every handler is scoped to the authenticated user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use models::{Category, Expense, MessageResponse};

use super::auth::AuthUser;
use super::{ApiJson, ApiPath};
use crate::error::ApiError;
use crate::services::ledger;
use crate::state::AppState;

/// `GET /api/categories`
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(ledger::list_categories(state.store.as_ref(), auth.scope()).await?))
}

/// `POST /api/categories`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<ledger::CategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = ledger::create_category(state.store.as_ref(), auth.scope(), input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /api/categories/{id}`
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(ledger::show_category(state.store.as_ref(), auth.scope(), id).await?))
}

/// `PUT /api/categories/{id}`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ledger::CategoryInput>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(ledger::update_category(state.store.as_ref(), auth.scope(), id, input).await?))
}

/// `DELETE /api/categories/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    ledger::delete_category(state.store.as_ref(), auth.scope(), id).await?;
    Ok(Json(MessageResponse::new("Category deleted successfully.")))
}

/// `GET /api/categories/{id}/expenses`
pub async fn expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    Ok(Json(ledger::category_expenses(state.store.as_ref(), auth.scope(), id).await?))
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
