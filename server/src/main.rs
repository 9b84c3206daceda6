mod config;
mod db;
mod error;
mod routes;
mod services;
mod state;
mod store;

use config::{ConfigError, ServerConfig};
use store::StoreError;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("store init failed: {0}")]
    Store(#[from] StoreError),
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "spendy server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    let store = store::create_store(&config).await?;

    let port = config.port;
    tracing::info!(
        backend = ?config.backend,
        logout_scope = ?config.logout_scope,
        token_ttl_secs = config.token_ttl.map(|ttl| ttl.as_secs()),
        "configuration loaded"
    );

    let app = routes::app(state::AppState::new(store, config));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "spendy listening");
    axum::serve(listener, app).await?;
    Ok(())
}
