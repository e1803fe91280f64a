//! Account lifecycle: registration, login and password change.
//!
//! Each successful operation issues a new token and stores it on the user
//! row. The stored token is never read back for verification, and issuing a
//! new token leaves previously issued ones valid until they expire.

use std::sync::Arc;

use tracing::info;

use crate::auth::context::UserContext;
use crate::auth::token::TokenIssuer;
use crate::auth::user_store::{CredentialError, UserStore, hash_password};
use crate::types::{AccessToken, UserId, Username};

/// Coordinates the credential store and the token issuer.
#[derive(Clone)]
pub struct AccountService {
    users: UserStore,
    issuer: Arc<TokenIssuer>,
}

impl AccountService {
    pub fn new(users: UserStore, issuer: Arc<TokenIssuer>) -> Self {
        Self { users, issuer }
    }

    #[cfg(test)]
    pub(crate) fn user_store(&self) -> &UserStore {
        &self.users
    }

    /// Register a new account and return its first token.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AccessToken, CredentialError> {
        let (username, password) = require_credentials(username, password)?;

        let user_id = self.users.register(&username, password).await?;
        info!(user_id = %user_id, username = %username, "User registered");

        self.issue_and_store(&username, user_id).await
    }

    /// Log in with a username and password and return a fresh token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AccessToken, CredentialError> {
        let (username, password) = require_credentials(username, password)?;

        let user_id = self.users.verify_credentials(&username, password).await?;
        info!(user_id = %user_id, "User logged in");

        self.issue_and_store(&username, user_id).await
    }

    /// Replace the caller's password and return a fresh token.
    pub async fn change_password(
        &self,
        user: &UserContext,
        new_password: &str,
    ) -> Result<AccessToken, CredentialError> {
        if new_password.is_empty() {
            return Err(CredentialError::MissingField("newPassword"));
        }

        let token = self.issuer.issue(user.username(), user.user_id())?;
        self.users
            .set_password(user.user_id(), &hash_password(new_password), &token)
            .await?;
        info!(user_id = %user.user_id(), "Password changed");

        Ok(token)
    }

    async fn issue_and_store(
        &self,
        username: &Username,
        user_id: UserId,
    ) -> Result<AccessToken, CredentialError> {
        let token = self.issuer.issue(username, user_id)?;
        self.users.set_token(user_id, &token).await?;
        Ok(token)
    }
}

fn require_credentials<'a>(
    username: &str,
    password: &'a str,
) -> Result<(Username, &'a str), CredentialError> {
    if username.is_empty() {
        return Err(CredentialError::MissingField("username"));
    }
    if password.is_empty() {
        return Err(CredentialError::MissingField("password"));
    }
    Ok((Username::new(username), password))
}
