//! Spendy client library.
//!
//! ARCHITECTURE
//! ============
//! - [`session`]: signed-in user + token, mirrored into a [`storage`] backend
//! - [`router`]: route table and the guards evaluated before each navigation
//! - [`http`]: the interceptor every request passes through
//! - [`api`]: typed endpoint calls on top of the interceptor
//! - [`notify`]: where interceptor notices go
//!
//! [`Spendy`] wires the pieces together around one shared session.

pub mod api;
pub mod http;
pub mod notify;
pub mod router;
pub mod session;
pub mod storage;

use std::sync::Arc;

pub use api::Api;
pub use http::{ApiError, ClientConfig, Interceptor};
pub use notify::Notifier;
pub use router::{Navigator, Route, Router};
pub use session::SessionStore;
pub use storage::Storage;

/// Session, router, and API client sharing one session.
#[derive(Debug, Clone)]
pub struct Spendy {
    pub session: SessionStore,
    pub router: Router,
    pub api: Api,
}

impl Spendy {
    /// # Errors
    ///
    /// Returns [`ApiError::Build`] if the HTTP client cannot be created.
    pub fn new(config: &ClientConfig, storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let session = SessionStore::new(storage);
        let router = Router::new(session.clone());
        let http = Interceptor::new(config, session.clone(), Arc::new(router.clone()), notifier)?;
        Ok(Self { session, router, api: Api::new(http) })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use models::User;
    use serde_json::json;

    pub fn user(id: i64, name: &str) -> User {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:00:00Z",
        }))
        .unwrap()
    }

    pub fn user_json(id: i64, name: &str) -> serde_json::Value {
        serde_json::to_value(user(id, name)).unwrap()
    }
}
