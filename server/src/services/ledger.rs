//! Categories, expenses, and incomes for the authenticated user.
//!
//! DESIGN
//! ======
//! Every function takes the caller's [`Scope`] and passes it straight to the
//! store, so a row owned by someone else is indistinguishable from a row
//! that does not exist. Update and delete resolve the target first and only
//! then validate the body, matching the usual 404-before-422 ordering.

use models::{Category, Expense, Income};
use serde::Deserialize;
use serde_json::Value;

use super::validate::Validator;
use crate::error::ApiError;
use crate::store::{CategoryFields, ExpenseFields, IncomeFields, Scope, Store};

pub const TEXT_MAX: usize = 255;

pub const CATEGORY: &str = "Category";
pub const EXPENSE: &str = "Expense";
pub const INCOME: &str = "Income";

pub const CATEGORY_INVALID: &str = "The selected category id is invalid.";

// =============================================================================
// INPUTS
// =============================================================================

/// Any `user_id` in the body is ignored; the owner always comes from the scope.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryInput {
    pub name: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExpenseInput {
    pub category_id: Option<Value>,
    pub amount: Option<Value>,
    pub description: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncomeInput {
    pub source: Option<Value>,
    pub amount: Option<Value>,
    pub description: Option<Value>,
}

fn category_fields(input: &CategoryInput) -> Result<CategoryFields, ApiError> {
    let mut v = Validator::new();
    let name = v.required_string("name", input.name.as_ref(), TEXT_MAX);
    v.finish()?;
    Ok(CategoryFields { name })
}

async fn expense_fields(store: &dyn Store, scope: Scope, input: &ExpenseInput) -> Result<ExpenseFields, ApiError> {
    let mut v = Validator::new();
    let category_id = v.id("category_id", input.category_id.as_ref());
    let amount = v.amount("amount", input.amount.as_ref());
    let description = v.optional_string("description", input.description.as_ref(), TEXT_MAX);
    if !v.has("category_id") && store.find_category(scope, category_id).await?.is_none() {
        v.add("category_id", CATEGORY_INVALID);
    }
    v.finish()?;
    Ok(ExpenseFields { category_id, amount, description })
}

fn income_fields(input: &IncomeInput) -> Result<IncomeFields, ApiError> {
    let mut v = Validator::new();
    let source = v.required_string("source", input.source.as_ref(), TEXT_MAX);
    let amount = v.amount("amount", input.amount.as_ref());
    let description = v.optional_string("description", input.description.as_ref(), TEXT_MAX);
    v.finish()?;
    Ok(IncomeFields { source, amount, description })
}

// =============================================================================
// CATEGORIES
// =============================================================================

pub async fn list_categories(store: &dyn Store, scope: Scope) -> Result<Vec<Category>, ApiError> {
    Ok(store.list_categories(scope).await?)
}

pub async fn show_category(store: &dyn Store, scope: Scope, id: i64) -> Result<Category, ApiError> {
    store
        .find_category(scope, id)
        .await?
        .ok_or(ApiError::NotFound(CATEGORY))
}

pub async fn create_category(store: &dyn Store, scope: Scope, input: CategoryInput) -> Result<Category, ApiError> {
    let fields = category_fields(&input)?;
    let category = store.create_category(scope, &fields).await?;
    tracing::debug!(user_id = scope.user_id(), category_id = category.id, "category created");
    Ok(category)
}

pub async fn update_category(
    store: &dyn Store,
    scope: Scope,
    id: i64,
    input: CategoryInput,
) -> Result<Category, ApiError> {
    show_category(store, scope, id).await?;
    let fields = category_fields(&input)?;
    store
        .update_category(scope, id, &fields)
        .await?
        .ok_or(ApiError::NotFound(CATEGORY))
}

/// Deletes the category and its expenses.
pub async fn delete_category(store: &dyn Store, scope: Scope, id: i64) -> Result<(), ApiError> {
    if !store.delete_category(scope, id).await? {
        return Err(ApiError::NotFound(CATEGORY));
    }
    tracing::debug!(user_id = scope.user_id(), category_id = id, "category deleted");
    Ok(())
}

/// Expenses filed under one of the caller's categories.
///
/// # Errors
///
/// [`ApiError::NotFound`] when the category is missing or belongs to
/// another user.
pub async fn category_expenses(store: &dyn Store, scope: Scope, id: i64) -> Result<Vec<Expense>, ApiError> {
    show_category(store, scope, id).await?;
    Ok(store.list_expenses(scope, Some(id)).await?)
}

// =============================================================================
// EXPENSES
// =============================================================================

pub async fn list_expenses(store: &dyn Store, scope: Scope, category_id: Option<i64>) -> Result<Vec<Expense>, ApiError> {
    Ok(store.list_expenses(scope, category_id).await?)
}

pub async fn show_expense(store: &dyn Store, scope: Scope, id: i64) -> Result<Expense, ApiError> {
    store
        .find_expense(scope, id)
        .await?
        .ok_or(ApiError::NotFound(EXPENSE))
}

pub async fn create_expense(store: &dyn Store, scope: Scope, input: ExpenseInput) -> Result<Expense, ApiError> {
    let fields = expense_fields(store, scope, &input).await?;
    Ok(store.create_expense(scope, &fields).await?)
}

pub async fn update_expense(store: &dyn Store, scope: Scope, id: i64, input: ExpenseInput) -> Result<Expense, ApiError> {
    show_expense(store, scope, id).await?;
    let fields = expense_fields(store, scope, &input).await?;
    store
        .update_expense(scope, id, &fields)
        .await?
        .ok_or(ApiError::NotFound(EXPENSE))
}

pub async fn delete_expense(store: &dyn Store, scope: Scope, id: i64) -> Result<(), ApiError> {
    if store.delete_expense(scope, id).await? { Ok(()) } else { Err(ApiError::NotFound(EXPENSE)) }
}

// =============================================================================
// INCOMES
// =============================================================================

pub async fn list_incomes(store: &dyn Store, scope: Scope) -> Result<Vec<Income>, ApiError> {
    Ok(store.list_incomes(scope).await?)
}

pub async fn show_income(store: &dyn Store, scope: Scope, id: i64) -> Result<Income, ApiError> {
    store
        .find_income(scope, id)
        .await?
        .ok_or(ApiError::NotFound(INCOME))
}

pub async fn create_income(store: &dyn Store, scope: Scope, input: IncomeInput) -> Result<Income, ApiError> {
    let fields = income_fields(&input)?;
    Ok(store.create_income(scope, &fields).await?)
}

pub async fn update_income(store: &dyn Store, scope: Scope, id: i64, input: IncomeInput) -> Result<Income, ApiError> {
    show_income(store, scope, id).await?;
    let fields = income_fields(&input)?;
    store
        .update_income(scope, id, &fields)
        .await?
        .ok_or(ApiError::NotFound(INCOME))
}

pub async fn delete_income(store: &dyn Store, scope: Scope, id: i64) -> Result<(), ApiError> {
    if store.delete_income(scope, id).await? { Ok(()) } else { Err(ApiError::NotFound(INCOME)) }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
