//! User context for request-scoped identity.

use serde::{Deserialize, Serialize};

use crate::auth::token::VerifiedIdentity;
use crate::types::{UserId, Username};

/// Identity of the caller, extracted from a verified bearer token.
///
/// Every protected operation takes this as its scoping parameter. It is
/// immutable once created and never built from request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    user_id: UserId,
    username: Username,
}

impl UserContext {
    /// Create a new user context.
    pub fn new(user_id: UserId, username: Username) -> Self {
        Self { user_id, username }
    }

    /// Get the database user ID.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Get the username carried by the token.
    pub fn username(&self) -> &Username {
        &self.username
    }
}

impl From<VerifiedIdentity> for UserContext {
    fn from(identity: VerifiedIdentity) -> Self {
        Self::new(identity.user_id, identity.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_context_new() {
        let ctx = UserContext::new(UserId::new(5), Username::new("alice"));

        assert_eq!(ctx.user_id(), UserId::new(5));
        assert_eq!(ctx.username().as_str(), "alice");
    }

    #[test]
    fn test_user_context_from_identity() {
        let ctx: UserContext = VerifiedIdentity {
            user_id: UserId::new(9),
            username: Username::new("bob"),
        }
        .into();

        assert_eq!(ctx.user_id().get(), 9);
        assert_eq!(ctx.username().as_str(), "bob");
    }
}
