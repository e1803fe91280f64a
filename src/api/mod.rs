// REST API endpoints for the contacts service

pub mod contacts;
pub mod users;


use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AccountService, AuthExtractor};
use crate::contacts::ContactStore;
use crate::history::HistoryRecorder;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub contacts: Arc<ContactStore>,
    pub history: Arc<HistoryRecorder>,
    pub auth: AuthExtractor,
}

impl FromRef<AppState> for AuthExtractor {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route(
            "/users/history",
            get(users::get_history).delete(users::clear_history),
        )
        .route("/users/password", patch(users::change_password))
        .route(
            "/contacts",
            post(contacts::create_contact).get(contacts::list_contacts),
        )
        .route("/contacts/search", post(contacts::search_contacts))
        .route(
            "/contacts/{id}",
            get(contacts::get_contact)
                .patch(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
