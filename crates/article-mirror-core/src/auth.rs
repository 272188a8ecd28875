//! Capability check.
//!
//! Mutations and reindex require a [`Principal`], which only a [`Verifier`]
//! hands out. The core never inspects credentials itself; transports pass
//! the raw bearer value through and the configured verifier decides.

use crate::error::Result;

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Author id recorded on articles this principal creates.
    pub user_id: i64,
    pub email: Option<String>,
}

/// Verifies a bearer credential.
///
/// Implementations must fail closed:
/// - no credential → [`Error::Unauthorized`](crate::Error::Unauthorized)
/// - a credential that does not verify → [`Error::Forbidden`](crate::Error::Forbidden)
pub trait Verifier: Send + Sync {
    fn verify(&self, credential: Option<&str>) -> Result<Principal>;
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
