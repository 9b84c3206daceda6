//! Process-local [`Store`] used by tests and `STORE_BACKEND=memory`.
//!
//! Mirrors the Postgres schema: per-table id sequences, unique emails,
//! cascading deletes, and the same list ordering.

use std::collections::BTreeMap;

use async_trait::async_trait;
use models::{Category, Expense, Income, User};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{
    CategoryFields, ExpenseFields, IncomeFields, NewToken, NewUser, Scope, Store, StoreError, TokenOwner, UserRecord,
};

#[derive(Debug, Clone)]
struct TokenRow {
    id: i64,
    user_id: i64,
    token_hash: String,
    expires_at: Option<OffsetDateTime>,
    last_used_at: Option<OffsetDateTime>,
}

/// Rows that belong to a user.
trait Owned {
    fn owner(&self) -> i64;
}

impl Owned for Category {
    fn owner(&self) -> i64 {
        self.user_id
    }
}

impl Owned for Expense {
    fn owner(&self) -> i64 {
        self.user_id
    }
}

impl Owned for Income {
    fn owner(&self) -> i64 {
        self.user_id
    }
}

fn owned<T: Owned>(table: &BTreeMap<i64, T>, scope: Scope) -> impl Iterator<Item = &T> {
    table.values().filter(move |row| row.owner() == scope.user_id())
}

fn owned_mut<T: Owned>(table: &mut BTreeMap<i64, T>, scope: Scope, id: i64) -> Option<&mut T> {
    table.get_mut(&id).filter(|row| row.owner() == scope.user_id())
}

fn remove_owned<T: Owned>(table: &mut BTreeMap<i64, T>, scope: Scope, id: i64) -> bool {
    if owned_mut(table, scope, id).is_none() {
        return false;
    }
    table.remove(&id).is_some()
}

#[derive(Default)]
struct Sequences {
    users: i64,
    tokens: i64,
    categories: i64,
    expenses: i64,
    incomes: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    users: BTreeMap<i64, UserRecord>,
    tokens: BTreeMap<i64, TokenRow>,
    categories: BTreeMap<i64, Category>,
    expenses: BTreeMap<i64, Expense>,
    incomes: BTreeMap<i64, Income>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|rec| rec.user.email == email && Some(rec.user.id) != except)
    }
}

/// Newest first, matching `ORDER BY created_at DESC, id DESC`.
fn newest_first<T: Clone>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> (OffsetDateTime, i64)) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
    rows
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-used stamp of a token, if it exists.
    #[cfg(test)]
    pub(crate) async fn token_last_used(&self, token_id: i64) -> Option<OffsetDateTime> {
        self.tables.read().await.tokens.get(&token_id)?.last_used_at
    }

    /// Number of live tokens held by `user_id`.
    #[cfg(test)]
    pub(crate) async fn token_count(&self, user_id: i64) -> usize {
        self.tables
            .read()
            .await
            .tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&new.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: next(&mut tables.seq.users),
            name: new.name,
            email: new.email,
            created_at: now,
            updated_at: now,
        };
        tables
            .users
            .insert(user.id, UserRecord { user: user.clone(), password_hash: new.password_hash });
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|rec| rec.user.email == email)
            .cloned())
    }

    async fn find_user(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn update_profile(&self, id: i64, name: &str, email: &str) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(email, Some(id)) {
            return Err(StoreError::DuplicateEmail);
        }
        let Some(rec) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        name.clone_into(&mut rec.user.name);
        email.clone_into(&mut rec.user.email);
        rec.user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(rec.user.clone()))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(rec) = tables.users.get_mut(&id) {
            password_hash.clone_into(&mut rec.password_hash);
            rec.user.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id);
        tables.tokens.retain(|_, t| t.user_id != id);
        tables.categories.retain(|_, c| c.user_id != id);
        tables.expenses.retain(|_, e| e.user_id != id);
        tables.incomes.retain(|_, i| i.user_id != id);
        Ok(())
    }

    async fn insert_token(&self, token: NewToken) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let id = next(&mut tables.seq.tokens);
        tables.tokens.insert(
            id,
            TokenRow {
                id,
                user_id: token.user_id,
                token_hash: token.token_hash,
                expires_at: token.expires_at,
                last_used_at: None,
            },
        );
        Ok(id)
    }

    async fn find_token_owner(&self, token_hash: &str, now: OffsetDateTime) -> Result<Option<TokenOwner>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(token) = tables
            .tokens
            .values_mut()
            .find(|t| t.token_hash == token_hash && t.expires_at.is_none_or(|exp| exp > now))
        else {
            return Ok(None);
        };
        token.last_used_at = Some(now);
        let (token_id, user_id) = (token.id, token.user_id);

        Ok(tables
            .users
            .get(&user_id)
            .map(|rec| TokenOwner { token_id, user: rec.user.clone() }))
    }

    async fn delete_token(&self, token_id: i64) -> Result<(), StoreError> {
        self.tables.write().await.tokens.remove(&token_id);
        Ok(())
    }

    async fn delete_user_tokens(&self, user_id: i64) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.tokens.len();
        tables.tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - tables.tokens.len()) as u64)
    }

    // -------------------------------------------------------------------------
    // categories
    // -------------------------------------------------------------------------

    async fn list_categories(&self, scope: Scope) -> Result<Vec<Category>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Category> = owned(&tables.categories, scope).cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn find_category(&self, scope: Scope, id: i64) -> Result<Option<Category>, StoreError> {
        let tables = self.tables.read().await;
        Ok(owned(&tables.categories, scope).find(|c| c.id == id).cloned())
    }

    async fn create_category(&self, scope: Scope, fields: &CategoryFields) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let category = Category {
            id: next(&mut tables.seq.categories),
            user_id: scope.user_id(),
            name: fields.name.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        scope: Scope,
        id: i64,
        fields: &CategoryFields,
    ) -> Result<Option<Category>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(category) = owned_mut(&mut tables.categories, scope, id) else {
            return Ok(None);
        };
        category.name.clone_from(&fields.name);
        category.updated_at = OffsetDateTime::now_utc();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, scope: Scope, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if !remove_owned(&mut tables.categories, scope, id) {
            return Ok(false);
        }
        tables.expenses.retain(|_, e| e.category_id != id);
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // expenses
    // -------------------------------------------------------------------------

    async fn list_expenses(&self, scope: Scope, category_id: Option<i64>) -> Result<Vec<Expense>, StoreError> {
        let tables = self.tables.read().await;
        let rows = owned(&tables.expenses, scope)
            .filter(|e| category_id.is_none_or(|cid| e.category_id == cid))
            .cloned();
        Ok(newest_first(rows, |e| (e.created_at, e.id)))
    }

    async fn find_expense(&self, scope: Scope, id: i64) -> Result<Option<Expense>, StoreError> {
        let tables = self.tables.read().await;
        Ok(owned(&tables.expenses, scope).find(|e| e.id == id).cloned())
    }

    async fn create_expense(&self, scope: Scope, fields: &ExpenseFields) -> Result<Expense, StoreError> {
        let mut tables = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let expense = Expense {
            id: next(&mut tables.seq.expenses),
            user_id: scope.user_id(),
            category_id: fields.category_id,
            amount: fields.amount,
            description: fields.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn update_expense(&self, scope: Scope, id: i64, fields: &ExpenseFields) -> Result<Option<Expense>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(expense) = owned_mut(&mut tables.expenses, scope, id) else {
            return Ok(None);
        };
        expense.category_id = fields.category_id;
        expense.amount = fields.amount;
        expense.description.clone_from(&fields.description);
        expense.updated_at = OffsetDateTime::now_utc();
        Ok(Some(expense.clone()))
    }

    async fn delete_expense(&self, scope: Scope, id: i64) -> Result<bool, StoreError> {
        Ok(remove_owned(&mut self.tables.write().await.expenses, scope, id))
    }

    // -------------------------------------------------------------------------
    // incomes
    // -------------------------------------------------------------------------

    async fn list_incomes(&self, scope: Scope) -> Result<Vec<Income>, StoreError> {
        let tables = self.tables.read().await;
        let rows = owned(&tables.incomes, scope).cloned();
        Ok(newest_first(rows, |i| (i.created_at, i.id)))
    }

    async fn find_income(&self, scope: Scope, id: i64) -> Result<Option<Income>, StoreError> {
        let tables = self.tables.read().await;
        Ok(owned(&tables.incomes, scope).find(|i| i.id == id).cloned())
    }

    async fn create_income(&self, scope: Scope, fields: &IncomeFields) -> Result<Income, StoreError> {
        let mut tables = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let income = Income {
            id: next(&mut tables.seq.incomes),
            user_id: scope.user_id(),
            source: fields.source.clone(),
            amount: fields.amount,
            description: fields.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.incomes.insert(income.id, income.clone());
        Ok(income)
    }

    async fn update_income(&self, scope: Scope, id: i64, fields: &IncomeFields) -> Result<Option<Income>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(income) = owned_mut(&mut tables.incomes, scope, id) else {
            return Ok(None);
        };
        income.source.clone_from(&fields.source);
        income.amount = fields.amount;
        income.description.clone_from(&fields.description);
        income.updated_at = OffsetDateTime::now_utc();
        Ok(Some(income.clone()))
    }

    async fn delete_income(&self, scope: Scope, id: i64) -> Result<bool, StoreError> {
        Ok(remove_owned(&mut self.tables.write().await.incomes, scope, id))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
