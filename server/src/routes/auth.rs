//! Auth routes: register, login, logout, and account maintenance.

use axum::extract::{FromRef, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use models::{AuthResponse, MessageResponse, ProfileResponse, User};

use super::ApiJson;
use crate::error::ApiError;
use crate::services::auth as auth_svc;
use crate::state::AppState;
use crate::store::{Scope, TokenOwner};

/// Pull the token out of `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user resolved from the bearer token.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: User,
    pub token_id: i64,
}

impl AuthUser {
    /// Ownership scope for ledger queries.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::for_user(&self.user)
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthenticated)?;

        let app_state = AppState::from_ref(state);
        let TokenOwner { token_id, user } = auth_svc::validate(app_state.store.as_ref(), token).await?;

        Ok(Self { user, token_id })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<auth_svc::RegisterInput>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let resp = auth_svc::register(state.store.as_ref(), &state.config, input).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<auth_svc::LoginInput>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(auth_svc::login(state.store.as_ref(), &state.config, input).await?))
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> Result<Json<MessageResponse>, ApiError> {
    let owner = TokenOwner { token_id: auth.token_id, user: auth.user };
    auth_svc::logout(state.store.as_ref(), &state.config, &owner).await?;
    Ok(Json(MessageResponse::new("You have been successfully logged out.")))
}

/// `GET /api/user`
pub async fn me(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}

/// `PUT /api/auth/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<auth_svc::ProfileInput>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = auth_svc::update_profile(state.store.as_ref(), &auth.user, input).await?;
    Ok(Json(ProfileResponse { message: "Profile updated successfully.".to_owned(), user }))
}

/// `PUT /api/auth/password`
pub async fn update_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<auth_svc::PasswordInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth_svc::update_password(state.store.as_ref(), &auth.user, input).await?;
    Ok(Json(MessageResponse::new("Password updated successfully.")))
}

/// `DELETE /api/auth/account`
pub async fn delete_account(State(state): State<AppState>, auth: AuthUser) -> Result<Json<MessageResponse>, ApiError> {
    auth_svc::delete_account(state.store.as_ref(), &auth.user).await?;
    Ok(Json(MessageResponse::new("Account deleted successfully.")))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
