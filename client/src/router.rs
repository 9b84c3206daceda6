//! Route table and navigation guards.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views are addressed by path (`/categories`, `/category/3/expenses`, ...).
//! Every navigation is checked against the session before it commits:
//! protected views bounce signed-out users to `/login`, and the login and
//! register views bounce signed-in users to `/`.
//!
//! DESIGN
//! ======
//! [`guard`] is a pure function of the target and the auth flag. [`Router`]
//! wraps it with the live session and remembers where it landed; it is also
//! the [`Navigator`] the HTTP interceptor redirects through on a 401.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Public,
    /// Requires a session; otherwise redirect to Login.
    Protected,
    /// Login/Register; a signed-in user is sent Home.
    GuestOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Income,
    Expense,
    Categories,
    CategoryExpenses(i64),
    /// Catch-all for unknown paths; keeps the requested path for display.
    NotFound(String),
}

impl Route {
    /// Match a path against the table. Query strings and trailing slashes
    /// are ignored.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["income"] => Self::Income,
            ["expense"] => Self::Expense,
            ["categories"] => Self::Categories,
            ["category", id, "expenses"] => match id.parse() {
                Ok(id) => Self::CategoryExpenses(id),
                Err(_) => Self::NotFound(path.to_owned()),
            },
            _ => Self::NotFound(path.to_owned()),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Income => "/income".to_owned(),
            Self::Expense => "/expense".to_owned(),
            Self::Categories => "/categories".to_owned(),
            Self::CategoryExpenses(id) => format!("/category/{id}/expenses"),
            Self::NotFound(path) => path.clone(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Categories => "Categories",
            Self::CategoryExpenses(_) => "CategoryExpenses",
            Self::NotFound(_) => "NotFound",
        }
    }

    #[must_use]
    pub fn gate(&self) -> Gate {
        match self {
            Self::Home | Self::NotFound(_) => Gate::Public,
            Self::Login | Self::Register => Gate::GuestOnly,
            Self::Income | Self::Expense | Self::Categories | Self::CategoryExpenses(_) => Gate::Protected,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where a navigation to `target` should end up instead, if anywhere.
#[must_use]
pub fn guard(target: &Route, authenticated: bool) -> Option<Route> {
    match (target.gate(), authenticated) {
        (Gate::Protected, false) => Some(Route::Login),
        (Gate::GuestOnly, true) => Some(Route::Home),
        _ => None,
    }
}

// =============================================================================
// ROUTER
// =============================================================================

pub trait Navigator: Send + Sync {
    /// Navigate to `target` and return the route that actually committed.
    fn navigate(&self, target: Route) -> Route;
}

#[derive(Clone)]
pub struct Router {
    session: SessionStore,
    current: Arc<Mutex<Route>>,
}

impl Router {
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self { session, current: Arc::new(Mutex::new(Route::Home)) }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Parse `path` and navigate to it.
    pub fn navigate_path(&self, path: &str) -> Route {
        self.navigate(Route::parse(path))
    }
}

impl Navigator for Router {
    fn navigate(&self, target: Route) -> Route {
        let landed = match guard(&target, self.session.is_authenticated()) {
            Some(redirect) => {
                tracing::debug!(from = %target, to = %redirect, "navigation redirected");
                redirect
            }
            None => target,
        };
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = landed.clone();
        landed
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("current", &self.current()).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
