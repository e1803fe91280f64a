//! Credential storage.

use std::fmt;

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::db::schema::UserRecord;
use crate::db::{Db, next_id};
use crate::types::{AccessToken, PasswordHash, UserId, Username};

/// Credential errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// A required field was missing or empty
    MissingField(&'static str),
    /// Username is already registered
    DuplicateUsername(String),
    /// Unknown username or wrong password; the two are not distinguished
    InvalidCredentials,
    /// Database error
    Database(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "Missing required field: {}", field),
            Self::DuplicateUsername(name) => write!(f, "User '{}' already exists", name),
            Self::InvalidCredentials => write!(f, "Invalid username or password"),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for CredentialError {}

impl From<anyhow::Error> for CredentialError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<surrealdb::Error> for CredentialError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Derive the stored hash for a password: base64(SHA-256(password)).
pub fn hash_password(password: &str) -> PasswordHash {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    PasswordHash::new(STANDARD.encode(hasher.finalize()))
}

/// User store for database operations.
#[derive(Clone)]
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Create a new user store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Register a new account and return its ID.
    ///
    /// Usernames are matched exactly (case-sensitive). The unique index on
    /// `username` backs the pre-check, so a concurrent registration of the
    /// same name still surfaces as [`CredentialError::DuplicateUsername`].
    pub async fn register(
        &self,
        username: &Username,
        password: &str,
    ) -> Result<UserId, CredentialError> {
        if self.get_user_by_username(username).await?.is_some() {
            return Err(CredentialError::DuplicateUsername(username.to_string()));
        }

        let id = next_id(&self.db, "user").await?;
        let password_hash = hash_password(password);

        let query = r#"
            CREATE type::thing('user', $id) CONTENT {
                username: $username,
                password_hash: $password_hash,
                token: NONE
            }
        "#;

        let result = self
            .db
            .query(query)
            .bind(("id", id))
            .bind(("username", username.to_string()))
            .bind(("password_hash", password_hash.into_inner()))
            .await
            .and_then(|res| res.check());

        match result {
            Ok(_) => Ok(UserId::new(id)),
            Err(e) if is_unique_violation(&e) => {
                Err(CredentialError::DuplicateUsername(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check a username/password pair and return the matching user ID.
    pub async fn verify_credentials(
        &self,
        username: &Username,
        password: &str,
    ) -> Result<UserId, CredentialError> {
        let user = self
            .get_user_by_username(username)
            .await?
            .ok_or(CredentialError::InvalidCredentials)?;

        if hash_password(password).as_str() != user.password_hash {
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(UserId::new(user.id))
    }

    /// Get a user by username.
    pub async fn get_user_by_username(&self, username: &Username) -> Result<Option<UserRecord>> {
        let query = r#"
            SELECT record::id(id) AS id, username, password_hash, token
            FROM user
            WHERE username = $username
            LIMIT 1
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("username", username.to_string()))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Get a user by database ID.
    #[cfg(test)]
    pub(crate) async fn get_user_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>> {
        let query = r#"
            SELECT record::id(id) AS id, username, password_hash, token
            FROM type::thing('user', $id)
        "#;

        let mut res = self.db.query(query).bind(("id", user_id.get())).await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Overwrite the password hash and the stored token in one update.
    pub async fn set_password(
        &self,
        user_id: UserId,
        password_hash: &PasswordHash,
        token: &AccessToken,
    ) -> Result<()> {
        let query = r#"
            UPDATE type::thing('user', $id) SET
                password_hash = $password_hash,
                token = $new_token
        "#;

        self.db
            .query(query)
            .bind(("id", user_id.get()))
            .bind(("password_hash", password_hash.to_string()))
            .bind(("new_token", token.to_string()))
            .await?
            .check()?;

        Ok(())
    }

    /// Remember the last token issued to a user.
    ///
    /// `$token` is reserved by SurrealDB, so the value is bound as `$new_token`.
    pub async fn set_token(&self, user_id: UserId, token: &AccessToken) -> Result<()> {
        self.db
            .query("UPDATE type::thing('user', $id) SET token = $new_token")
            .bind(("id", user_id.get()))
            .bind(("new_token", token.to_string()))
            .await?
            .check()?;

        Ok(())
    }
}

fn is_unique_violation(err: &surrealdb::Error) -> bool {
    match err {
        surrealdb::Error::Db(surrealdb::error::Db::IndexExists { .. }) => true,
        // Remote engines only forward the message, e.g.
        // "Database index `user_username` already contains 'u1', with record `user:1`"
        other => other.to_string().contains("already contains"),
    }
}
