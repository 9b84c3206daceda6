//! API error taxonomy and its HTTP mapping.
//!
//! Every handler returns `Result<_, ApiError>`. Internal details are logged
//! here and never echoed to the caller.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use models::ErrorBody;

use crate::services::password::PasswordError;
use crate::services::validate::ValidationErrors;
use crate::store::StoreError;

pub const INVALID_CREDENTIALS: &str = "The provided credentials are incorrect.";
pub const EMAIL_TAKEN: &str = "The email has already been taken.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(ValidationErrors),
    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("{INVALID_CREDENTIALS}")]
    InvalidCredentials,
    #[error("Unauthenticated.")]
    Unauthenticated,
    /// Also used for rows owned by someone else.
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidCredentials => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Rejected { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::Validation(errors) => ErrorBody { message: errors.message(), errors: Some(errors.to_map()) },
            Self::InvalidCredentials => {
                let errors = ValidationErrors::single("email", INVALID_CREDENTIALS);
                ErrorBody { message: INVALID_CREDENTIALS.to_owned(), errors: Some(errors.to_map()) }
            }
            Self::Internal(_) => ErrorBody { message: "Server Error".to_owned(), errors: None },
            other => ErrorBody { message: other.to_string(), errors: None },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::Validation(ValidationErrors::single("email", EMAIL_TAKEN)),
            StoreError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
