//! Postgres-backed [`Store`].
//!
//! Ledger queries are built through [`scoped`], which binds the owner as `$1`;
//! every ledger statement starts its predicate with `user_id = $1`.

use async_trait::async_trait;
use models::{Category, Expense, Income, User};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use time::OffsetDateTime;

use super::{
    CategoryFields, ExpenseFields, IncomeFields, NewToken, NewUser, Scope, Store, StoreError, TokenOwner, UserRecord,
};

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";
const CATEGORY_COLUMNS: &str = "id, user_id, name, created_at, updated_at";
const EXPENSE_COLUMNS: &str = "id, user_id, category_id, amount, description, created_at, updated_at";
const INCOME_COLUMNS: &str = "id, user_id, source, amount, description, created_at, updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Start a ledger query with the owner bound as `$1`.
fn scoped(sql: &str, scope: Scope) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(sql).bind(scope.user_id())
}

fn map_unique(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        _ => StoreError::Database(err),
    }
}

// =============================================================================
// ROW MAPPING
// =============================================================================

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_record_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord { user: user_from_row(row)?, password_hash: row.try_get("password_hash")? })
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn expense_from_row(row: &PgRow) -> Result<Expense, sqlx::Error> {
    Ok(Expense {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        category_id: row.try_get("category_id")?,
        amount: row.try_get("amount")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn income_from_row(row: &PgRow) -> Result<Income, sqlx::Error> {
    Ok(Income {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        source: row.try_get("source")?,
        amount: row.try_get("amount")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn collect<T>(rows: &[PgRow], map: fn(&PgRow) -> Result<T, sqlx::Error>) -> Result<Vec<T>, StoreError> {
    Ok(rows.iter().map(map).collect::<Result<Vec<_>, _>>()?)
}

fn first<T>(row: Option<&PgRow>, map: fn(&PgRow) -> Result<T, sqlx::Error>) -> Result<Option<T>, StoreError> {
    Ok(row.map(map).transpose()?)
}

// =============================================================================
// STORE IMPL
// =============================================================================

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let sql = format!("INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(user_from_row(&row)?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        let row = sqlx::query(&sql).bind(email).fetch_optional(&self.pool).await?;
        first(row.as_ref(), user_record_from_row)
    }

    async fn find_user(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        first(row.as_ref(), user_record_from_row)
    }

    async fn update_profile(&self, id: i64, name: &str, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(name)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique)?;
        first(row.as_ref(), user_from_row)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        // Tokens and ledger rows go with the user via ON DELETE CASCADE.
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_token(&self, token: NewToken) -> Result<i64, StoreError> {
        let row = sqlx::query(
            "INSERT INTO auth_tokens (user_id, name, token_hash, expires_at) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(token.user_id)
        .bind(&token.name)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn find_token_owner(&self, token_hash: &str, now: OffsetDateTime) -> Result<Option<TokenOwner>, StoreError> {
        let row = sqlx::query(
            r"WITH touched AS (
                  UPDATE auth_tokens
                  SET last_used_at = $2
                  WHERE token_hash = $1 AND (expires_at IS NULL OR expires_at > $2)
                  RETURNING id, user_id
              )
              SELECT t.id AS token_id, u.id, u.name, u.email, u.created_at, u.updated_at
              FROM touched t
              JOIN users u ON u.id = t.user_id",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(TokenOwner { token_id: row.try_get("token_id")?, user: user_from_row(&row)? }))
    }

    async fn delete_token(&self, token_id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM auth_tokens WHERE id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user_tokens(&self, user_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // -------------------------------------------------------------------------
    // categories
    // -------------------------------------------------------------------------

    async fn list_categories(&self, scope: Scope) -> Result<Vec<Category>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = $1 ORDER BY name, id");
        let rows = scoped(&sql, scope).fetch_all(&self.pool).await?;
        collect(&rows, category_from_row)
    }

    async fn find_category(&self, scope: Scope, id: i64) -> Result<Option<Category>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = $1 AND id = $2");
        let row = scoped(&sql, scope).bind(id).fetch_optional(&self.pool).await?;
        first(row.as_ref(), category_from_row)
    }

    async fn create_category(&self, scope: Scope, fields: &CategoryFields) -> Result<Category, StoreError> {
        let sql = format!("INSERT INTO categories (user_id, name) VALUES ($1, $2) RETURNING {CATEGORY_COLUMNS}");
        let row = scoped(&sql, scope)
            .bind(&fields.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(category_from_row(&row)?)
    }

    async fn update_category(
        &self,
        scope: Scope,
        id: i64,
        fields: &CategoryFields,
    ) -> Result<Option<Category>, StoreError> {
        let sql = format!(
            "UPDATE categories SET name = $3, updated_at = now() WHERE user_id = $1 AND id = $2 RETURNING {CATEGORY_COLUMNS}"
        );
        let row = scoped(&sql, scope)
            .bind(id)
            .bind(&fields.name)
            .fetch_optional(&self.pool)
            .await?;
        first(row.as_ref(), category_from_row)
    }

    async fn delete_category(&self, scope: Scope, id: i64) -> Result<bool, StoreError> {
        let result = scoped("DELETE FROM categories WHERE user_id = $1 AND id = $2", scope)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // expenses
    // -------------------------------------------------------------------------

    async fn list_expenses(&self, scope: Scope, category_id: Option<i64>) -> Result<Vec<Expense>, StoreError> {
        let sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses
             WHERE user_id = $1 AND ($2::BIGINT IS NULL OR category_id = $2)
             ORDER BY created_at DESC, id DESC"
        );
        let rows = scoped(&sql, scope)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        collect(&rows, expense_from_row)
    }

    async fn find_expense(&self, scope: Scope, id: i64) -> Result<Option<Expense>, StoreError> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = $1 AND id = $2");
        let row = scoped(&sql, scope).bind(id).fetch_optional(&self.pool).await?;
        first(row.as_ref(), expense_from_row)
    }

    async fn create_expense(&self, scope: Scope, fields: &ExpenseFields) -> Result<Expense, StoreError> {
        let sql = format!(
            "INSERT INTO expenses (user_id, category_id, amount, description) VALUES ($1, $2, $3, $4)
             RETURNING {EXPENSE_COLUMNS}"
        );
        let row = scoped(&sql, scope)
            .bind(fields.category_id)
            .bind(fields.amount)
            .bind(&fields.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(expense_from_row(&row)?)
    }

    async fn update_expense(&self, scope: Scope, id: i64, fields: &ExpenseFields) -> Result<Option<Expense>, StoreError> {
        let sql = format!(
            "UPDATE expenses SET category_id = $3, amount = $4, description = $5, updated_at = now()
             WHERE user_id = $1 AND id = $2
             RETURNING {EXPENSE_COLUMNS}"
        );
        let row = scoped(&sql, scope)
            .bind(id)
            .bind(fields.category_id)
            .bind(fields.amount)
            .bind(&fields.description)
            .fetch_optional(&self.pool)
            .await?;
        first(row.as_ref(), expense_from_row)
    }

    async fn delete_expense(&self, scope: Scope, id: i64) -> Result<bool, StoreError> {
        let result = scoped("DELETE FROM expenses WHERE user_id = $1 AND id = $2", scope)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // incomes
    // -------------------------------------------------------------------------

    async fn list_incomes(&self, scope: Scope) -> Result<Vec<Income>, StoreError> {
        let sql = format!("SELECT {INCOME_COLUMNS} FROM incomes WHERE user_id = $1 ORDER BY created_at DESC, id DESC");
        let rows = scoped(&sql, scope).fetch_all(&self.pool).await?;
        collect(&rows, income_from_row)
    }

    async fn find_income(&self, scope: Scope, id: i64) -> Result<Option<Income>, StoreError> {
        let sql = format!("SELECT {INCOME_COLUMNS} FROM incomes WHERE user_id = $1 AND id = $2");
        let row = scoped(&sql, scope).bind(id).fetch_optional(&self.pool).await?;
        first(row.as_ref(), income_from_row)
    }

    async fn create_income(&self, scope: Scope, fields: &IncomeFields) -> Result<Income, StoreError> {
        let sql = format!(
            "INSERT INTO incomes (user_id, source, amount, description) VALUES ($1, $2, $3, $4)
             RETURNING {INCOME_COLUMNS}"
        );
        let row = scoped(&sql, scope)
            .bind(&fields.source)
            .bind(fields.amount)
            .bind(&fields.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(income_from_row(&row)?)
    }

    async fn update_income(&self, scope: Scope, id: i64, fields: &IncomeFields) -> Result<Option<Income>, StoreError> {
        let sql = format!(
            "UPDATE incomes SET source = $3, amount = $4, description = $5, updated_at = now()
             WHERE user_id = $1 AND id = $2
             RETURNING {INCOME_COLUMNS}"
        );
        let row = scoped(&sql, scope)
            .bind(id)
            .bind(&fields.source)
            .bind(fields.amount)
            .bind(&fields.description)
            .fetch_optional(&self.pool)
            .await?;
        first(row.as_ref(), income_from_row)
    }

    async fn delete_income(&self, scope: Scope, id: i64) -> Result<bool, StoreError> {
        let result = scoped("DELETE FROM incomes WHERE user_id = $1 AND id = $2", scope)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "postgres_test.rs"]
mod tests;
