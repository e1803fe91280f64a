//! Row shapes read back from SurrealDB.
//!
//! Every query that returns one of these projects the integer record key
//! with `record::id(id) AS id`, so the rows carry plain integers rather than
//! full record ids.

use serde::{Deserialize, Serialize};

/// Persisted user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Integer key of the `user` record.
    pub id: i64,
    /// Unique, case-sensitive login name.
    pub username: String,
    /// Base64-encoded SHA-256 digest of the password.
    pub password_hash: String,
    /// Last token issued to this user. Informational only.
    #[serde(default)]
    pub token: Option<String>,
}

/// Persisted contact owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Integer key of the `contact` record.
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Owner column of a contact row.
///
/// Read back from `RETURN AFTER` / `RETURN BEFORE` to tell whether an
/// owner-scoped update or delete matched a row. Only plain fields are
/// decoded; the record id is skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactOwnerRecord {
    pub user_id: i64,
}

/// Persisted request history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestHistoryRecord {
    /// Integer key of the `request_history` record; follows insertion order.
    pub id: i64,
    pub request_url: String,
    /// `request_time` cast to an RFC 3339 string by the query.
    pub request_time: String,
}

/// Counter row used to hand out integer keys.
#[derive(Debug, Clone, Deserialize)]
pub struct IdCounterRecord {
    pub last_id: i64,
}
