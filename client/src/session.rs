//! Client-side session: the signed-in user snapshot and bearer token.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the only place the client decides "logged in or not". The HTTP
//! interceptor reads the token from here and clears it on a 401; the router
//! reads `is_authenticated` for its guards. Nothing here talks to the network.
//!
//! DESIGN
//! ======
//! State is mirrored into a [`Storage`] backend under fixed keys so a
//! restart picks the session back up. Handles are cheap clones sharing one
//! `Arc<Mutex<..>>`.

use std::sync::{Arc, Mutex, PoisonError};

use models::User;

use crate::storage::{MemoryStorage, Storage};

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "authToken";

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    token: Option<String>,
}

#[derive(Clone)]
pub struct SessionStore {
    state: Arc<Mutex<SessionState>>,
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    /// Load whatever session `storage` already holds.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let user = storage.get(USER_KEY).and_then(|raw| match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored user");
                None
            }
        });
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        Self { state: Arc::new(Mutex::new(SessionState { user, token })), storage }
    }

    /// Session backed by process memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(raw) => self.storage.set(USER_KEY, &raw),
            Err(e) => tracing::warn!(error = %e, "failed to encode user for storage"),
        }
    }

    /// Record a successful login or registration.
    pub fn set_user(&self, user: User, token: String) {
        self.persist_user(&user);
        self.storage.set(TOKEN_KEY, &token);
        let mut state = self.state();
        state.user = Some(user);
        state.token = Some(token);
    }

    /// Forget the session. Safe to call when already signed out.
    pub fn clear_user(&self) {
        {
            let mut state = self.state();
            state.user = None;
            state.token = None;
        }
        self.storage.remove(USER_KEY);
        self.storage.remove(TOKEN_KEY);
    }

    /// Replace the user snapshot after a profile edit; the token is untouched.
    pub fn update_user(&self, user: User) {
        self.persist_user(&user);
        self.state().user = Some(user);
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let state = self.state();
        state.user.is_some() && state.token.is_some()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SessionStore")
            .field("user", &state.user.as_ref().map(|u| u.id))
            .field("token", &state.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
