//! JWT utilities shared across the Pricing BFF crates.
//!
//! This module provides the pre-verification half of token handling:
//! - Size limits for DoS prevention
//! - Unverified header/payload decoding (issuer, token use and key id are
//!   checked *before* any key lookup or signature verification)
//! - Composite-username splitting for the identity provider's
//!   `<domain-tag>_<username>` format
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Nothing in this module verifies a signature; callers MUST verify the
//!   token after the peek succeeds
//! - Error messages are intentionally generic to prevent information leakage

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Typical access tokens are well under 1KB; anything larger is rejected
/// before base64 decoding or JSON parsing takes place.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// The delimiter between the directory domain tag and the real username in
/// the provider's composite `username` claim.
pub const COMPOSITE_USERNAME_DELIMITER: char = '_';

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while decoding a token's unverified structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenDecodeError {
    /// Token size exceeds maximum allowed.
    #[error("Not a valid JWT token")]
    TokenTooLarge,

    /// Token is not a three-part JWT, or a part is not valid base64url JSON.
    #[error("Not a valid JWT token")]
    MalformedToken,
}

// =============================================================================
// Unverified token structure
// =============================================================================

/// A decoded-but-unverified JWT: header and payload as raw JSON values.
///
/// Used for the structural checks that must run before key lookup and
/// signature verification (issuer, token use, key id). The signature part
/// is deliberately not retained here.
#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    /// Decoded JOSE header.
    pub header: serde_json::Value,

    /// Decoded claims payload.
    pub payload: serde_json::Value,
}

impl UnverifiedToken {
    /// The `kid` header value, if present and a non-empty string.
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.header
            .get("kid")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// The `iss` claim, if present.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.payload.get("iss").and_then(|v| v.as_str())
    }

    /// The `token_use` claim, if present.
    #[must_use]
    pub fn token_use(&self) -> Option<&str> {
        self.payload.get("token_use").and_then(|v| v.as_str())
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Decode a JWT's header and payload without verifying the signature.
///
/// # Security
///
/// - Token size is checked BEFORE any parsing
/// - The result is untrusted input: the token MUST still be verified
///   against the provider's key before any claim is acted upon
///
/// # Errors
///
/// Returns [`TokenDecodeError::TokenTooLarge`] when the token exceeds
/// [`MAX_JWT_SIZE_BYTES`], and [`TokenDecodeError::MalformedToken`] when it
/// is not a three-part JWT of base64url-encoded JSON.
pub fn decode_unverified(token: &str) -> Result<UnverifiedToken, TokenDecodeError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenDecodeError::TokenTooLarge);
    }

    let mut parts = token.split('.');
    let (header_part, payload_part) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(header), Some(payload), Some(_signature), None) => (header, payload),
        _ => {
            tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
            return Err(TokenDecodeError::MalformedToken);
        }
    };

    let header = decode_json_part(header_part)?;
    let payload = decode_json_part(payload_part)?;

    Ok(UnverifiedToken { header, payload })
}

/// Decode one base64url JWT part into JSON.
fn decode_json_part(part: &str) -> Result<serde_json::Value, TokenDecodeError> {
    let bytes = URL_SAFE_NO_PAD.decode(part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT part base64");
        TokenDecodeError::MalformedToken
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT part JSON");
        TokenDecodeError::MalformedToken
    })
}

/// Split a composite `<domain-tag>_<username>` claim into its two halves.
///
/// Returns `None` unless the value splits on the first delimiter into two
/// non-empty parts. Further delimiters stay inside the username half, so
/// `CORP_jane_doe` yields `("CORP", "jane_doe")`.
#[must_use]
pub fn split_composite_username(composite: &str) -> Option<(&str, &str)> {
    let (domain_tag, username) = composite.split_once(COMPOSITE_USERNAME_DELIMITER)?;
    if domain_tag.is_empty() || username.is_empty() {
        return None;
    }
    Some((domain_tag, username))
}

// =============================================================================
// Tests
// =============================================================================
