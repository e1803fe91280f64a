//! Owner-scoped contact records.
//!
//! Every operation takes the caller's [`UserId`](crate::types::UserId) and
//! filters by it. A contact owned by another user behaves exactly like one
//! that does not exist: both are reported as [`ContactError::NotFound`].

mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::db::schema::ContactRecord;
use crate::types::ContactId;

pub use store::ContactStore;

/// A contact as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl Contact {
    /// Case-insensitive substring match over name, phone, email and address.
    ///
    /// The empty term matches every contact.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        [
            Some(self.name.as_str()),
            Some(self.phone_number.as_str()),
            self.email.as_deref(),
            self.address.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl From<ContactRecord> for Contact {
    fn from(row: ContactRecord) -> Self {
        Self {
            id: ContactId::new(row.id),
            name: row.name,
            phone_number: row.phone_number,
            email: row.email,
            address: row.address,
        }
    }
}

/// Field values for creating a contact or fully replacing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Name and phone number are required and must be non-empty.
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.trim().is_empty() {
            return Err(ContactError::MissingField("name"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(ContactError::MissingField("phoneNumber"));
        }
        Ok(())
    }
}

/// Errors from contact operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// A required field was missing or empty
    MissingField(&'static str),
    /// No contact with this ID belongs to the caller
    NotFound(ContactId),
    /// Database error
    Database(String),
}

impl fmt::Display for ContactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "Missing required field: {}", field),
            Self::NotFound(id) => write!(f, "Contact {} not found", id),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for ContactError {}

impl From<anyhow::Error> for ContactError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<surrealdb::Error> for ContactError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}
