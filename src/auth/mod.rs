//! Authentication and user context module.
//!
//! - **Credentials**: usernames with base64 SHA-256 password hashes
//! - **Tokens**: HS256 JWTs carrying `{sub, name, jti, exp}`
//! - **Gate**: the `Authorization: Bearer <token>` header is verified before
//!   any protected handler runs
//!
//! ## Security Model
//!
//! - User identity comes only from a verified token, never from a request body
//! - All contact and history operations are scoped by the caller's user ID
//! - Tokens are not revocable; they expire naturally
//!
//! ## Usage
//!
//! ```ignore
//! async fn handler(user: UserContext, State(state): State<AppState>) {
//!     let contacts = state.contacts.list(user.user_id()).await?;
//! }
//! ```

mod accounts;
mod context;
mod extractor;
mod token;
mod user_store;

pub use accounts::AccountService;
pub use context::UserContext;
pub use extractor::{AuthError, AuthExtractor};
pub use token::{
    DEFAULT_TOKEN_TTL_SECONDS, MIN_KEY_BYTES, SessionClaims, TokenIssuer, VerifiedIdentity,
};
pub use user_store::{CredentialError, UserStore, hash_password};
