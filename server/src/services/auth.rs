//! Token issuer: registration, login, logout, token validation, and account
//! maintenance.
//!
//! ARCHITECTURE
//! ============
//! Plain tokens leave this module exactly once, in the [`AuthResponse`] of
//! `register`/`login`. Everything persisted is a digest (see
//! [`super::token`]) and every later request is resolved through
//! [`validate`].
//!
//! TRADE-OFFS
//! ==========
//! Login answers unknown emails and wrong passwords with the same error, so
//! the endpoint cannot be used to probe for registered addresses. Register
//! still reports "email taken", which is the usual compromise for sign-up
//! forms.

use models::{AuthResponse, User};
use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;

use super::password;
use super::token::{generate_token, hash_token};
use super::validate::{ValidationErrors, Validator};
use crate::config::{LogoutScope, ServerConfig};
use crate::error::{ApiError, EMAIL_TAKEN};
use crate::store::{NewToken, NewUser, Store, TokenOwner};

/// Label recorded on every issued token.
pub const TOKEN_NAME: &str = "auth_token";

pub const NAME_MAX: usize = 25;
pub const PASSWORD_MIN: usize = 8;

pub const CURRENT_PASSWORD_INCORRECT: &str = "The provided current password is incorrect.";

// =============================================================================
// INPUTS
// =============================================================================

/// Request bodies keep every field as raw JSON so type errors become field
/// messages. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub password: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: Option<Value>,
    pub password: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub name: Option<Value>,
    pub email: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordInput {
    pub current_password: Option<Value>,
    pub new_password: Option<Value>,
}

// =============================================================================
// TOKENS
// =============================================================================

/// Mint a token for `user_id`, persist its digest, and return the plain value.
///
/// # Errors
///
/// Returns an error if the token row cannot be stored.
pub async fn issue_token(store: &dyn Store, config: &ServerConfig, user_id: i64) -> Result<String, ApiError> {
    let token = generate_token();
    let expires_at = config.token_ttl.map(|ttl| OffsetDateTime::now_utc() + ttl);
    store
        .insert_token(NewToken { user_id, token_hash: hash_token(&token), name: TOKEN_NAME.to_owned(), expires_at })
        .await?;
    Ok(token)
}

/// Resolve a presented bearer token to its owner.
///
/// # Errors
///
/// [`ApiError::Unauthenticated`] for empty, unknown, revoked, or expired tokens.
pub async fn validate(store: &dyn Store, token: &str) -> Result<TokenOwner, ApiError> {
    if token.is_empty() {
        return Err(ApiError::Unauthenticated);
    }
    store
        .find_token_owner(&hash_token(token), OffsetDateTime::now_utc())
        .await?
        .ok_or(ApiError::Unauthenticated)
}

// =============================================================================
// REGISTER / LOGIN / LOGOUT
// =============================================================================

/// Create a user and sign them in.
///
/// # Errors
///
/// Validation errors for bad input or a taken email; internal errors from
/// the store or hasher.
pub async fn register(store: &dyn Store, config: &ServerConfig, input: RegisterInput) -> Result<AuthResponse, ApiError> {
    let mut v = Validator::new();
    let name = v.required_string("name", input.name.as_ref(), NAME_MAX);
    let email = v.email("email", input.email.as_ref());
    let password = v.password("password", input.password.as_ref(), PASSWORD_MIN);
    if !v.has("email") && store.find_user_by_email(&email).await?.is_some() {
        v.add("email", EMAIL_TAKEN);
    }
    v.finish()?;

    let password_hash = password::hash_password_blocking(password).await?;
    let user = store.create_user(NewUser { name, email, password_hash }).await?;
    let token = issue_token(store, config, user.id).await?;
    tracing::info!(user_id = user.id, "user registered");
    Ok(AuthResponse { token, user })
}

/// Exchange credentials for a fresh token. Existing tokens stay valid.
///
/// # Errors
///
/// Validation errors for missing fields; [`ApiError::InvalidCredentials`]
/// when the email is unknown or the password does not match.
pub async fn login(store: &dyn Store, config: &ServerConfig, input: LoginInput) -> Result<AuthResponse, ApiError> {
    let mut v = Validator::new();
    let email = v.email("email", input.email.as_ref());
    let password = v.password("password", input.password.as_ref(), 1);
    v.finish()?;

    let Some(record) = store.find_user_by_email(&email).await? else {
        tracing::debug!("login for unknown email");
        password::verify_against_dummy_blocking(password).await?;
        return Err(ApiError::InvalidCredentials);
    };
    if !password::verify_password_blocking(password, record.password_hash).await? {
        tracing::debug!(user_id = record.user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(store, config, record.user.id).await?;
    Ok(AuthResponse { token, user: record.user })
}

/// Revoke tokens per `LOGOUT_SCOPE`.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn logout(store: &dyn Store, config: &ServerConfig, owner: &TokenOwner) -> Result<(), ApiError> {
    match config.logout_scope {
        LogoutScope::All => {
            let revoked = store.delete_user_tokens(owner.user.id).await?;
            tracing::info!(user_id = owner.user.id, revoked, "logged out everywhere");
        }
        LogoutScope::Current => {
            store.delete_token(owner.token_id).await?;
            tracing::info!(user_id = owner.user.id, token_id = owner.token_id, "logged out");
        }
    }
    Ok(())
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// Change name and email. The user's own email does not count as taken.
///
/// # Errors
///
/// Validation errors for bad input or an email held by another user.
pub async fn update_profile(store: &dyn Store, user: &User, input: ProfileInput) -> Result<User, ApiError> {
    let mut v = Validator::new();
    let name = v.required_string("name", input.name.as_ref(), NAME_MAX);
    let email = v.email("email", input.email.as_ref());
    if !v.has("email")
        && let Some(existing) = store.find_user_by_email(&email).await?
        && existing.user.id != user.id
    {
        v.add("email", EMAIL_TAKEN);
    }
    v.finish()?;

    store
        .update_profile(user.id, &name, &email)
        .await?
        .ok_or(ApiError::Unauthenticated)
}

/// Replace the password after checking the current one.
///
/// # Errors
///
/// Validation errors for bad input or a wrong current password.
pub async fn update_password(store: &dyn Store, user: &User, input: PasswordInput) -> Result<(), ApiError> {
    let mut v = Validator::new();
    let current = v.password("current_password", input.current_password.as_ref(), 1);
    let new = v.password("new_password", input.new_password.as_ref(), PASSWORD_MIN);
    v.finish()?;

    let record = store.find_user(user.id).await?.ok_or(ApiError::Unauthenticated)?;
    if !password::verify_password_blocking(current, record.password_hash).await? {
        return Err(ValidationErrors::single("current_password", CURRENT_PASSWORD_INCORRECT).into());
    }

    let password_hash = password::hash_password_blocking(new).await?;
    store.update_password(user.id, &password_hash).await?;
    tracing::info!(user_id = user.id, "password changed");
    Ok(())
}

/// Delete the user, their tokens, and every ledger row they own.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn delete_account(store: &dyn Store, user: &User) -> Result<(), ApiError> {
    store.delete_user_tokens(user.id).await?;
    store.delete_user(user.id).await?;
    tracing::info!(user_id = user.id, "account deleted");
    Ok(())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
