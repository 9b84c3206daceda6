//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every JSON endpoint lives under `/api` and answers with either the
//! resource or an `ErrorBody`. `/healthz` sits outside `/api` for load
//! balancer probes.
//!
//! Extractor rejections are routed through [`ApiJson`] and [`ApiPath`] so
//! malformed bodies and ids get the same JSON error shape as everything else.

pub mod auth;
pub mod categories;
pub mod expenses;
pub mod incomes;

use std::time::Duration;

use axum::Router;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// `axum::Json` with [`ApiError`] as the rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with [`ApiError`] as the rejection.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/password", put(auth::update_password))
        .route("/auth/account", delete(auth::delete_account))
        .route("/user", get(auth::me))
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::show)
                .put(categories::update)
                .patch(categories::update)
                .delete(categories::destroy),
        )
        .route("/categories/{id}/expenses", get(categories::expenses))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::show)
                .put(expenses::update)
                .patch(expenses::update)
                .delete(expenses::destroy),
        )
        .route("/incomes", get(incomes::list).post(incomes::create))
        .route(
            "/incomes/{id}",
            get(incomes::show)
                .put(incomes::update)
                .patch(incomes::update)
                .delete(incomes::destroy),
        )
}

/// Full application router with CORS, tracing, and request timeout layers.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let limit = state.config.request_timeout;

    let router = Router::new()
        .nest("/api", api_routes())
        .route("/healthz", get(healthz))
        .with_state(state);
    with_timeout(router, limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub const REQUEST_TIMED_OUT: &str = "The request took too long to complete.";

/// Abort requests that run past `limit` with a 408 carrying the usual
/// `ErrorBody`.
fn with_timeout(router: Router, limit: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, limit))
        .layer(middleware::map_response(timeout_body))
}

/// No handler answers 408 itself, so every 408 here came from the timeout.
async fn timeout_body(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    tracing::warn!("request timed out");
    ApiError::Rejected { status: StatusCode::REQUEST_TIMEOUT, message: REQUEST_TIMED_OUT.to_owned() }.into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
