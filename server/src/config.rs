//! Server configuration parsed from environment variables.
//!
//! `main` loads `.env` (via `dotenvy`) before calling [`ServerConfig::from_env`];
//! tests go through [`ServerConfig::from_lookup`] so they never touch the
//! process environment.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local store. Data is lost on restart.
    Memory,
}

/// Which tokens `POST /auth/logout` revokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoutScope {
    /// Every token the user holds ("sign out everywhere").
    #[default]
    All,
    /// Only the token presented with the logout request.
    Current,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// `None` keeps tokens valid until explicitly revoked.
    pub token_ttl: Option<Duration>,
    pub logout_scope: LogoutScope,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend: StoreBackend::Postgres,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            token_ttl: None,
            logout_scope: LogoutScope::All,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL required when STORE_BACKEND=postgres")]
    MissingDatabaseUrl,
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl ServerConfig {
    /// Build typed config from the process environment.
    ///
    /// - `STORE_BACKEND`: `postgres` (default) or `memory`
    /// - `DATABASE_URL`: required for `postgres`
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `TOKEN_TTL_SECS`: unset or `0` disables expiry
    /// - `LOGOUT_SCOPE`: `all` (default) or `current`
    /// - `REQUEST_TIMEOUT_SECS`: default 30
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but unparseable, or when
    /// the Postgres backend is selected without a database URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match lookup("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("" | "postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(invalid("STORE_BACKEND", other)),
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let logout_scope = match lookup("LOGOUT_SCOPE").as_deref().map(str::trim) {
            None | Some("" | "all") => LogoutScope::All,
            Some("current") => LogoutScope::Current,
            Some(other) => return Err(invalid("LOGOUT_SCOPE", other)),
        };

        let token_ttl = parse_or(&lookup, "TOKEN_TTL_SECS", 0_u64)?;
        let request_timeout = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            backend,
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            token_ttl: (token_ttl > 0).then(|| Duration::from_secs(token_ttl)),
            logout_scope,
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid { key, value: value.to_owned() }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| invalid(key, &raw)),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
