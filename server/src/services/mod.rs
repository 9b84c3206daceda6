//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and business rules so route handlers can
//! stay focused on protocol translation and auth plumbing. Services reach
//! storage only through `&dyn Store`.

pub mod auth;
pub mod ledger;
pub mod password;
pub mod token;
pub mod validate;
