// Core modules
mod config;
pub mod db;
pub mod types;
pub mod error;

// Domain modules
pub mod auth;
pub mod contacts;
pub mod history;
pub mod api;
pub mod client;

// Re-export key types and functions
pub use db::{DatabaseConfig, Db, create_connection, ensure_schema};
pub use config::{JwtConfig, ServiceConfig, resolve_config_path};
pub use api::{AppState, create_router};
pub use client::{ClientConfig, ClientError, ContactsClient};

use std::sync::Arc;
use anyhow::Result;
use auth::{AccountService, AuthExtractor, TokenIssuer, UserStore};
use contacts::ContactStore;
use history::HistoryRecorder;

/// Wire the stores and the token issuer around an open database handle.
pub fn build_state(db: Db, jwt: &JwtConfig) -> Result<AppState> {
    let issuer = Arc::new(TokenIssuer::new(jwt.key.as_bytes(), jwt.ttl_seconds)?);

    Ok(AppState {
        accounts: Arc::new(AccountService::new(UserStore::new(db.clone()), issuer.clone())),
        contacts: Arc::new(ContactStore::new(db.clone())),
        history: Arc::new(HistoryRecorder::new(db)),
        auth: AuthExtractor::new(issuer),
    })
}

/// Convenience function to create the fully configured HTTP application.
///
/// Connects to the database, applies the schema and returns the router.
pub async fn create_app(config: ServiceConfig) -> Result<axum::Router> {
    let db = create_connection(config.database).await?;
    ensure_schema(&db).await?;

    let state = build_state(db, &config.jwt)?;
    Ok(create_router(state))
}
