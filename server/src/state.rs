//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! server keeps no per-request state of its own; everything durable lives
//! behind the `Store` trait object.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::Store;

/// Clone is required by Axum; both fields are `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> Self {
        Self { store, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
