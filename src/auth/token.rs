//! Session token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with a server-held symmetric key. Verification
//! is purely signature + expiry: issuer and audience are not checked and there
//! is no revocation list, so a token stays valid until it expires even after
//! the user logs in again or changes their password.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::auth::extractor::AuthError;
use crate::types::{AccessToken, UserId, Username};

/// Default token lifetime in seconds (1 hour).
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3600;

/// Minimum signing key length in bytes (256 bits) for HS256.
pub const MIN_KEY_BYTES: usize = 32;

/// Claims carried by every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID, decimal string)
    pub sub: String,
    /// Username
    pub name: String,
    /// Unique token ID
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Identity proven by a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: UserId,
    pub username: Username,
}

/// Creates and verifies session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: u64,
}

impl TokenIssuer {
    /// Create an issuer from the shared secret.
    ///
    /// Fails if the key is shorter than [`MIN_KEY_BYTES`].
    pub fn new(secret: &[u8], ttl_seconds: u64) -> anyhow::Result<Self> {
        if secret.len() < MIN_KEY_BYTES {
            anyhow::bail!(
                "JWT signing key must be at least {} bytes, got {}",
                MIN_KEY_BYTES,
                secret.len()
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_seconds,
        })
    }

    /// Issue a fresh token for the given user.
    pub fn issue(&self, username: &Username, user_id: UserId) -> anyhow::Result<AccessToken> {
        let claims = SessionClaims {
            sub: user_id.to_string(),
            name: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: unix_now() + self.ttl_seconds,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(AccessToken::new(token))
    }

    /// Verify signature and expiry, returning the identity in the token.
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let claims = token_data.claims;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))?;

        if claims.name.is_empty() {
            return Err(AuthError::InvalidToken("missing name claim".to_string()));
        }

        debug!("Token verified for user {}", user_id);

        Ok(VerifiedIdentity {
            user_id,
            username: Username::new(claims.name),
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
