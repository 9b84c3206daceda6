//! Persistence boundary for users, tokens, and ledger resources.
//!
//! ARCHITECTURE
//! ============
//! Handlers and services talk to an `Arc<dyn Store>`; the concrete backend
//! is Postgres in production and a process-local map for tests and demos.
//!
//! OWNERSHIP
//! =========
//! Every category/expense/income operation takes a [`Scope`]. A scope can
//! only be minted from a user that the token issuer has already validated,
//! and each backend applies it in a single helper (`scoped` for Postgres,
//! `owned`/`owned_mut` for memory). Rows outside the scope are invisible,
//! so cross-user access surfaces as "not found" rather than "forbidden".

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use models::{Category, Expense, Income, User};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::config::{ServerConfig, StoreBackend};

pub use memory::MemoryStore;
pub use postgres::PgStore;

// =============================================================================
// SCOPE
// =============================================================================

/// The owner every ledger query is filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope(i64);

impl Scope {
    /// Scope queries to an authenticated user.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self(user.id)
    }

    #[must_use]
    pub fn user_id(self) -> i64 {
        self.0
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A user row including the credential column.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    /// Argon2id PHC string.
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewToken {
    pub user_id: i64,
    /// SHA-256 hex digest of the plain token.
    pub token_hash: String,
    /// Label for the issuing client.
    pub name: String,
    pub expires_at: Option<OffsetDateTime>,
}

/// Result of a successful token lookup.
#[derive(Debug, Clone)]
pub struct TokenOwner {
    pub token_id: i64,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseFields {
    pub category_id: i64,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeFields {
    pub source: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// STORE TRAIT
// =============================================================================

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn find_user(&self, id: i64) -> Result<Option<UserRecord>, StoreError>;
    /// Returns `None` when the user no longer exists.
    async fn update_profile(&self, id: i64, name: &str, email: &str) -> Result<Option<User>, StoreError>;
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), StoreError>;
    /// Removes the user together with their tokens and ledger rows.
    async fn delete_user(&self, id: i64) -> Result<(), StoreError>;

    async fn insert_token(&self, token: NewToken) -> Result<i64, StoreError>;
    /// Resolve an unexpired token digest to its owner and stamp `last_used_at`.
    async fn find_token_owner(&self, token_hash: &str, now: OffsetDateTime) -> Result<Option<TokenOwner>, StoreError>;
    async fn delete_token(&self, token_id: i64) -> Result<(), StoreError>;
    /// Returns the number of revoked tokens.
    async fn delete_user_tokens(&self, user_id: i64) -> Result<u64, StoreError>;

    async fn list_categories(&self, scope: Scope) -> Result<Vec<Category>, StoreError>;
    async fn find_category(&self, scope: Scope, id: i64) -> Result<Option<Category>, StoreError>;
    async fn create_category(&self, scope: Scope, fields: &CategoryFields) -> Result<Category, StoreError>;
    async fn update_category(&self, scope: Scope, id: i64, fields: &CategoryFields)
    -> Result<Option<Category>, StoreError>;
    /// Deleting a category also deletes its expenses.
    async fn delete_category(&self, scope: Scope, id: i64) -> Result<bool, StoreError>;

    async fn list_expenses(&self, scope: Scope, category_id: Option<i64>) -> Result<Vec<Expense>, StoreError>;
    async fn find_expense(&self, scope: Scope, id: i64) -> Result<Option<Expense>, StoreError>;
    async fn create_expense(&self, scope: Scope, fields: &ExpenseFields) -> Result<Expense, StoreError>;
    async fn update_expense(&self, scope: Scope, id: i64, fields: &ExpenseFields) -> Result<Option<Expense>, StoreError>;
    async fn delete_expense(&self, scope: Scope, id: i64) -> Result<bool, StoreError>;

    async fn list_incomes(&self, scope: Scope) -> Result<Vec<Income>, StoreError>;
    async fn find_income(&self, scope: Scope, id: i64) -> Result<Option<Income>, StoreError>;
    async fn create_income(&self, scope: Scope, fields: &IncomeFields) -> Result<Income, StoreError>;
    async fn update_income(&self, scope: Scope, id: i64, fields: &IncomeFields) -> Result<Option<Income>, StoreError>;
    async fn delete_income(&self, scope: Scope, id: i64) -> Result<bool, StoreError>;
}

/// Build the backend selected by `STORE_BACKEND`.
///
/// # Errors
///
/// Returns an error if the Postgres pool cannot connect or migrate.
pub async fn create_store(config: &ServerConfig) -> Result<Arc<dyn Store>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let url = config.database_url.as_deref().unwrap_or_default();
            let pool = crate::db::init_pool(url, config.db_max_connections).await?;
            tracing::info!(max_connections = config.db_max_connections, "postgres store ready");
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
