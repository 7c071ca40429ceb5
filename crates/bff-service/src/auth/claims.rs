//! Verified access-token claims.
//!
//! Contains the claims extracted from a signature-verified token. The
//! `sub` field carries the provider's principal id and is redacted in
//! Debug output to keep it out of logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims of a verified access token.
///
/// `sub` and the composite `username` are optional at this layer: their
/// presence and shape are the validator's final structural check, not a
/// deserialization failure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Token issuer.
    pub iss: String,

    /// Token use type; only "access" tokens are honored.
    pub token_use: String,

    /// Subject (principal id) - redacted in Debug output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Composite `<domain-tag>_<username>` claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Custom Debug implementation that redacts the `sub` field.
impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("iss", &self.iss)
            .field("token_use", &self.token_use)
            .field("sub", &"[REDACTED]")
            .field("username", &self.username)
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .finish()
    }
}
