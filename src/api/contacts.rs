//! Contact endpoints under `/contacts`.
//!
//! Every handler takes a [`UserContext`], so authentication is settled before
//! the body or path is looked at.

use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::auth::UserContext;
use crate::contacts::{Contact, ContactDraft};
use crate::error::ApiError;
use crate::types::{ContactId, RequestPath};

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl From<ContactRequest> for ContactDraft {
    fn from(req: ContactRequest) -> Self {
        Self {
            name: req.name,
            phone_number: req.phone_number,
            email: req.email,
            address: req.address,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_term: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: ContactId,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn contact_path(id: ContactId) -> RequestPath {
    RequestPath::new(format!("/contacts/{}", id))
}

pub async fn create_contact(
    user: UserContext,
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let Json(req) = payload?;
    let id = state.contacts.create(user.user_id(), &req.into()).await?;

    state
        .history
        .record(user.user_id(), &RequestPath::new("/contacts"))
        .await?;

    Ok(Json(CreatedResponse {
        id,
        message: "Contact created".to_string(),
    }))
}

pub async fn list_contacts(
    user: UserContext,
    State(state): State<AppState>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = state.contacts.list(user.user_id()).await?;

    state
        .history
        .record(user.user_id(), &RequestPath::new("/contacts"))
        .await?;

    Ok(Json(contacts))
}

pub async fn get_contact(
    user: UserContext,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Contact>, ApiError> {
    let id = ContactId::new(id?.0);

    // Attempted reads are recorded even when the lookup fails
    state
        .history
        .record(user.user_id(), &contact_path(id))
        .await?;

    let contact = state.contacts.get(user.user_id(), id).await?;
    Ok(Json(contact))
}

pub async fn update_contact(
    user: UserContext,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = ContactId::new(id?.0);
    let Json(req) = payload?;

    state
        .contacts
        .update(user.user_id(), id, &req.into())
        .await?;

    state
        .history
        .record(user.user_id(), &contact_path(id))
        .await?;

    Ok(Json(MessageResponse {
        message: "Contact updated".to_string(),
    }))
}

pub async fn delete_contact(
    user: UserContext,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = ContactId::new(id?.0);
    state.contacts.delete(user.user_id(), id).await?;

    state
        .history
        .record(user.user_id(), &contact_path(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_contacts(
    user: UserContext,
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let Json(req) = payload?;
    let contacts = state
        .contacts
        .search(user.user_id(), &req.search_term)
        .await?;

    state
        .history
        .record(user.user_id(), &RequestPath::new("/contacts/search"))
        .await?;

    Ok(Json(contacts))
}
