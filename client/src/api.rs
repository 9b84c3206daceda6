//! Typed endpoint calls.
//!
//! Every call goes through the [`Interceptor`]; the auth calls also keep the
//! session in step with the server (store on login, clear on logout).

use models::{
    AuthResponse, Category, CategoryRequest, Expense, ExpenseRequest, Income, IncomeRequest, LoginRequest,
    MessageResponse, PasswordRequest, ProfileRequest, ProfileResponse, RegisterRequest, User,
};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::http::{ApiError, Interceptor};
use crate::session::SessionStore;

fn to_body<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct Api {
    http: Interceptor,
}

impl Api {
    #[must_use]
    pub fn new(http: Interceptor) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        self.http.session()
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// Register and sign in.
    ///
    /// # Errors
    ///
    /// Validation, network, or decode failures from the server call.
    pub async fn register(&self, req: &RegisterRequest) -> Result<User, ApiError> {
        let resp: AuthResponse = self
            .http
            .send(Method::POST, "/auth/register", Some(to_body(req)?))
            .await?;
        self.session().set_user(resp.user.clone(), resp.token);
        Ok(resp.user)
    }

    /// # Errors
    ///
    /// Bad credentials come back as a 422 with a field error on `email`.
    pub async fn login(&self, req: &LoginRequest) -> Result<User, ApiError> {
        let resp: AuthResponse = self
            .http
            .send(Method::POST, "/auth/login", Some(to_body(req)?))
            .await?;
        self.session().set_user(resp.user.clone(), resp.token);
        Ok(resp.user)
    }

    /// Revoke server-side and forget locally. The local session is cleared
    /// even when the server call fails.
    ///
    /// # Errors
    ///
    /// The server call's error, after the session has been cleared.
    pub async fn logout(&self) -> Result<MessageResponse, ApiError> {
        let result = self.http.send(Method::POST, "/auth/logout", None).await;
        self.session().clear_user();
        result
    }

    /// Fetch the current user and refresh the session snapshot.
    ///
    /// # Errors
    ///
    /// A 401 here also clears the session (via the interceptor).
    pub async fn me(&self) -> Result<User, ApiError> {
        let user: User = self.http.send(Method::GET, "/user", None).await?;
        self.session().update_user(user.clone());
        Ok(user)
    }

    pub async fn update_profile(&self, req: &ProfileRequest) -> Result<ProfileResponse, ApiError> {
        let resp: ProfileResponse = self
            .http
            .send(Method::PUT, "/auth/profile", Some(to_body(req)?))
            .await?;
        self.session().update_user(resp.user.clone());
        Ok(resp)
    }

    pub async fn update_password(&self, req: &PasswordRequest) -> Result<MessageResponse, ApiError> {
        self.http
            .send(Method::PUT, "/auth/password", Some(to_body(req)?))
            .await
    }

    pub async fn delete_account(&self) -> Result<MessageResponse, ApiError> {
        let resp = self.http.send(Method::DELETE, "/auth/account", None).await?;
        self.session().clear_user();
        Ok(resp)
    }

    // =========================================================================
    // CATEGORIES
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.http.send(Method::GET, "/categories", None).await
    }

    pub async fn get_category(&self, id: i64) -> Result<Category, ApiError> {
        self.http
            .send(Method::GET, &format!("/categories/{id}"), None)
            .await
    }

    pub async fn create_category(&self, req: &CategoryRequest) -> Result<Category, ApiError> {
        self.http
            .send(Method::POST, "/categories", Some(to_body(req)?))
            .await
    }

    pub async fn update_category(&self, id: i64, req: &CategoryRequest) -> Result<Category, ApiError> {
        self.http
            .send(Method::PUT, &format!("/categories/{id}"), Some(to_body(req)?))
            .await
    }

    pub async fn delete_category(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.http
            .send(Method::DELETE, &format!("/categories/{id}"), None)
            .await
    }

    pub async fn category_expenses(&self, id: i64) -> Result<Vec<Expense>, ApiError> {
        self.http
            .send(Method::GET, &format!("/categories/{id}/expenses"), None)
            .await
    }

    // =========================================================================
    // EXPENSES
    // =========================================================================

    pub async fn list_expenses(&self, category_id: Option<i64>) -> Result<Vec<Expense>, ApiError> {
        let path = match category_id {
            Some(id) => format!("/expenses?category_id={id}"),
            None => "/expenses".to_owned(),
        };
        self.http.send(Method::GET, &path, None).await
    }

    pub async fn get_expense(&self, id: i64) -> Result<Expense, ApiError> {
        self.http
            .send(Method::GET, &format!("/expenses/{id}"), None)
            .await
    }

    pub async fn create_expense(&self, req: &ExpenseRequest) -> Result<Expense, ApiError> {
        self.http
            .send(Method::POST, "/expenses", Some(to_body(req)?))
            .await
    }

    pub async fn update_expense(&self, id: i64, req: &ExpenseRequest) -> Result<Expense, ApiError> {
        self.http
            .send(Method::PUT, &format!("/expenses/{id}"), Some(to_body(req)?))
            .await
    }

    pub async fn delete_expense(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.http
            .send(Method::DELETE, &format!("/expenses/{id}"), None)
            .await
    }

    // =========================================================================
    // INCOMES
    // =========================================================================

    pub async fn list_incomes(&self) -> Result<Vec<Income>, ApiError> {
        self.http.send(Method::GET, "/incomes", None).await
    }

    pub async fn get_income(&self, id: i64) -> Result<Income, ApiError> {
        self.http
            .send(Method::GET, &format!("/incomes/{id}"), None)
            .await
    }

    pub async fn create_income(&self, req: &IncomeRequest) -> Result<Income, ApiError> {
        self.http
            .send(Method::POST, "/incomes", Some(to_body(req)?))
            .await
    }

    pub async fn update_income(&self, id: i64, req: &IncomeRequest) -> Result<Income, ApiError> {
        self.http
            .send(Method::PUT, &format!("/incomes/{id}"), Some(to_body(req)?))
            .await
    }

    pub async fn delete_income(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.http
            .send(Method::DELETE, &format!("/incomes/{id}"), None)
            .await
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
