//! Account and history endpoints under `/users`.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::auth::UserContext;
use crate::error::ApiError;
use crate::history::HistoryEntry;
use crate::types::RequestPath;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload?;
    let token = state.accounts.register(&req.username, &req.password).await?;

    Ok(Json(TokenResponse {
        token: token.into_inner(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload?;
    let token = state.accounts.login(&req.username, &req.password).await?;

    Ok(Json(TokenResponse {
        token: token.into_inner(),
    }))
}

pub async fn get_history(
    user: UserContext,
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let entries = state.history.get_all(user.user_id()).await?;
    Ok(Json(entries))
}

pub async fn clear_history(
    user: UserContext,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.history.delete_all(user.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    user: UserContext,
    State(state): State<AppState>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload?;
    let token = state
        .accounts
        .change_password(&user, &req.new_password)
        .await?;

    state
        .history
        .record(user.user_id(), &RequestPath::new("/users/password"))
        .await?;

    Ok(Json(TokenResponse {
        token: token.into_inner(),
    }))
}
