//! Bearer-token validation.
//!
//! Validates incoming access tokens against the identity provider's
//! published keys. Every check short-circuits to an unauthenticated
//! [`AuthOutcome`] with a display-safe cause; only infrastructure failures
//! (key-set fetch) surface as errors.
//!
//! # Security
//!
//! - Structural checks (issuer, token use, key id) run on the unverified
//!   token BEFORE any key lookup or cryptographic work
//! - Only RS256 is accepted; `alg: none` and HMAC confusion attempts fail
//!   signature verification
//! - Expiration is enforced by the verifier

use crate::auth::claims::AccessClaims;
use crate::auth::jwks::KeySetClient;
use crate::errors::BffError;
use crate::models::AuthOutcome;
use crate::observability::metrics;
use common::jwt::{decode_unverified, split_composite_username};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::instrument;

/// Rejection cause when the token header is absent.
pub const CAUSE_TOKEN_MISSING: &str = "Access token is missing from header";

/// Rejection cause when the token does not decode into a JWT structure.
pub const CAUSE_NOT_A_TOKEN: &str = "Not a valid JWT token";

/// Rejection cause when the issuer does not match configuration.
pub const CAUSE_INVALID_ISSUER: &str = "The issuer of the token is invalid";

/// Rejection cause when `token_use` is not an access token.
pub const CAUSE_WRONG_TOKEN_USE: &str = "Token is not an access token";

/// Rejection cause when no verification key matches the token's key id.
pub const CAUSE_UNKNOWN_KEY_ID: &str = "No verification key could be found for the given key id";

/// Rejection cause when identity claims are absent after verification.
pub const CAUSE_MISSING_IDENTITY: &str = "Required variables for authentication are invalid";

/// Rejection cause when the composite username has the wrong shape.
pub const CAUSE_MALFORMED_USERNAME: &str =
    "Username given in the authentication token is invalid";

/// Token validator using the provider's memoized key set.
pub struct TokenValidator {
    /// Key-set client for verification key lookup.
    key_set: Arc<KeySetClient>,

    /// Expected `iss` claim value.
    issuer: String,
}

impl TokenValidator {
    /// Create a new token validator.
    pub fn new(key_set: Arc<KeySetClient>, issuer: String) -> Self {
        Self { key_set, issuer }
    }

    /// Validate a bearer token and produce an authentication outcome.
    ///
    /// Checks run in strict order, each short-circuiting to a rejected
    /// outcome:
    ///
    /// 1. token present in the expected header
    /// 2. token decodes into a JWT header+payload structure
    /// 3. issuer matches configuration
    /// 4. `token_use` is `"access"`
    /// 5. a verification key exists for the token's `kid`
    /// 6. RS256 signature (and expiry) verify against that key
    /// 7. subject and composite username are present and well-formed
    ///
    /// A missing token never triggers a key-set fetch.
    ///
    /// # Errors
    ///
    /// Returns `BffError::KeySetFetch` only when the key set cannot be
    /// obtained - an infrastructure failure, distinct from any
    /// authentication rejection.
    #[instrument(skip_all, name = "bff.auth.validate")]
    pub async fn validate(&self, token: Option<&str>) -> Result<AuthOutcome, BffError> {
        let outcome = self.run_checks(token).await?;
        metrics::record_auth_outcome(&outcome);
        Ok(outcome)
    }

    async fn run_checks(&self, token: Option<&str>) -> Result<AuthOutcome, BffError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            tracing::warn!(target: "bff.auth.validate", "{}", CAUSE_TOKEN_MISSING);
            return Ok(AuthOutcome::rejected(CAUSE_TOKEN_MISSING));
        };

        let unverified = match decode_unverified(token) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(target: "bff.auth.validate", error = %e, "{}", CAUSE_NOT_A_TOKEN);
                return Ok(AuthOutcome::rejected(CAUSE_NOT_A_TOKEN));
            }
        };

        // Fail if the token is not from the configured user pool
        if unverified.issuer() != Some(self.issuer.as_str()) {
            tracing::warn!(target: "bff.auth.validate", "{}", CAUSE_INVALID_ISSUER);
            return Ok(AuthOutcome::rejected(CAUSE_INVALID_ISSUER));
        }

        // Reject the token if it is not an access token
        if unverified.token_use() != Some("access") {
            tracing::warn!(target: "bff.auth.validate", "{}", CAUSE_WRONG_TOKEN_USE);
            return Ok(AuthOutcome::rejected(CAUSE_WRONG_TOKEN_USE));
        }

        let Some(kid) = unverified.kid() else {
            tracing::warn!(target: "bff.auth.validate", "Token header carries no key id");
            return Ok(AuthOutcome::rejected(CAUSE_UNKNOWN_KEY_ID));
        };

        let Some(key) = self.key_set.get_key(kid).await? else {
            tracing::warn!(target: "bff.auth.validate", kid = %kid, "{}", CAUSE_UNKNOWN_KEY_ID);
            return Ok(AuthOutcome::rejected(CAUSE_UNKNOWN_KEY_ID));
        };

        let claims = match verify_token(token, &key) {
            Ok(claims) => claims,
            Err(cause) => {
                tracing::warn!(target: "bff.auth.validate", error = %cause, "Token signature verification failed");
                return Ok(AuthOutcome::rejected(&cause));
            }
        };

        self.extract_identity(&claims)
    }

    /// Final structural check on the verified claims.
    fn extract_identity(&self, claims: &AccessClaims) -> Result<AuthOutcome, BffError> {
        let (Some(sub), Some(composite)) = (claims.sub.as_deref(), claims.username.as_deref())
        else {
            tracing::warn!(target: "bff.auth.validate", "{}", CAUSE_MISSING_IDENTITY);
            return Ok(AuthOutcome::rejected(CAUSE_MISSING_IDENTITY));
        };

        match split_composite_username(composite) {
            Some((_domain_tag, username)) => {
                tracing::info!(
                    target: "bff.auth.validate",
                    principal = %sub,
                    username = %username,
                    "Caller authenticated"
                );
                Ok(AuthOutcome::authenticated(username.to_string()))
            }
            None => {
                tracing::warn!(target: "bff.auth.validate", "{}", CAUSE_MALFORMED_USERNAME);
                Ok(AuthOutcome::rejected(CAUSE_MALFORMED_USERNAME))
            }
        }
    }
}

/// Verify the token signature and expiry, returning the claims.
///
/// RS256 only. The verifier's error message becomes the rejection cause.
fn verify_token(token: &str, key: &DecodingKey) -> Result<AccessClaims, String> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;
    // Issuer and audience were checked structurally before key lookup
    validation.validate_aud = false;

    decode::<AccessClaims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use bff_test_utils::{AccessTokenBuilder, TestRsaKey};
    use std::collections::HashMap;

    const ISSUER: &str = "https://idp.test/pool-1";

    fn validator_with(keys: &[&TestRsaKey]) -> TokenValidator {
        let map: HashMap<String, DecodingKey> = keys
            .iter()
            .map(|k| {
                (
                    k.kid.clone(),
                    DecodingKey::from_rsa_components(&k.modulus, &k.exponent).unwrap(),
                )
            })
            .collect();
        TokenValidator::new(Arc::new(KeySetClient::preloaded(map)), ISSUER.to_string())
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let validator = validator_with(&[&TestRsaKey::primary()]);

        let outcome = validator.validate(None).await.unwrap();

        assert!(!outcome.authenticated);
        assert_eq!(outcome.cause.as_deref(), Some(CAUSE_TOKEN_MISSING));
    }

    #[tokio::test]
    async fn test_empty_token_rejected_as_missing() {
        let validator = validator_with(&[&TestRsaKey::primary()]);

        let outcome = validator.validate(Some("")).await.unwrap();

        assert_eq!(outcome.cause.as_deref(), Some(CAUSE_TOKEN_MISSING));
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let validator = validator_with(&[&TestRsaKey::primary()]);

        let outcome = validator.validate(Some("not-a-jwt")).await.unwrap();

        assert_eq!(outcome.cause.as_deref(), Some(CAUSE_NOT_A_TOKEN));
    }

    #[tokio::test]
    async fn test_wrong_issuer_rejected_even_with_valid_signature() {
        let key = TestRsaKey::primary();
        let validator = validator_with(&[&key]);
        let token = AccessTokenBuilder::new("https://idp.test/other-pool").sign(&key);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert_eq!(outcome.cause.as_deref(), Some(CAUSE_INVALID_ISSUER));
    }

    #[tokio::test]
    async fn test_id_token_rejected() {
        let key = TestRsaKey::primary();
        let validator = validator_with(&[&key]);
        let token = AccessTokenBuilder::new(ISSUER).with_token_use("id").sign(&key);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert_eq!(outcome.cause.as_deref(), Some(CAUSE_WRONG_TOKEN_USE));
    }

    #[tokio::test]
    async fn test_unknown_kid_rejected() {
        let primary = TestRsaKey::primary();
        let validator = validator_with(&[&primary]);
        // Signed by a key the validator does not know
        let rotated = TestRsaKey::secondary();
        let token = AccessTokenBuilder::new(ISSUER).sign(&rotated);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert_eq!(outcome.cause.as_deref(), Some(CAUSE_UNKNOWN_KEY_ID));
    }

    #[tokio::test]
    async fn test_signature_mismatch_rejected() {
        let primary = TestRsaKey::primary();
        let validator = validator_with(&[&primary]);
        // Signed with the secondary key but advertising the primary kid
        let token = AccessTokenBuilder::new(ISSUER)
            .sign_with_mismatched_kid(&TestRsaKey::secondary(), &primary.kid);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert!(!outcome.authenticated);
        // Cause carries the verifier's message, not one of the fixed causes
        assert!(outcome.cause.is_some());
        assert_ne!(outcome.cause.as_deref(), Some(CAUSE_UNKNOWN_KEY_ID));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let key = TestRsaKey::primary();
        let validator = validator_with(&[&key]);
        let token = AccessTokenBuilder::new(ISSUER).expires_in(-600).sign(&key);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert!(!outcome.authenticated);
    }

    #[tokio::test]
    async fn test_missing_subject_rejected() {
        let key = TestRsaKey::primary();
        let validator = validator_with(&[&key]);
        let token = AccessTokenBuilder::new(ISSUER).without_subject().sign(&key);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert_eq!(outcome.cause.as_deref(), Some(CAUSE_MISSING_IDENTITY));
    }

    #[tokio::test]
    async fn test_missing_username_rejected() {
        let key = TestRsaKey::primary();
        let validator = validator_with(&[&key]);
        let token = AccessTokenBuilder::new(ISSUER).without_username().sign(&key);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert_eq!(outcome.cause.as_deref(), Some(CAUSE_MISSING_IDENTITY));
    }

    #[tokio::test]
    async fn test_malformed_composite_username_rejected() {
        let key = TestRsaKey::primary();
        let validator = validator_with(&[&key]);
        let token = AccessTokenBuilder::new(ISSUER).with_username("jdoe").sign(&key);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert_eq!(outcome.cause.as_deref(), Some(CAUSE_MALFORMED_USERNAME));
    }

    #[tokio::test]
    async fn test_valid_token_authenticates_with_real_username() {
        let key = TestRsaKey::primary();
        let validator = validator_with(&[&key]);
        let token = AccessTokenBuilder::new(ISSUER)
            .for_subject("principal-001")
            .with_username("CORP_jdoe")
            .sign(&key);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert!(outcome.authenticated);
        assert_eq!(outcome.username.as_deref(), Some("jdoe"));
        assert!(outcome.cause.is_none());
    }

    #[tokio::test]
    async fn test_username_with_extra_delimiters_keeps_tail() {
        let key = TestRsaKey::primary();
        let validator = validator_with(&[&key]);
        let token = AccessTokenBuilder::new(ISSUER)
            .with_username("CORP_jane_doe")
            .sign(&key);

        let outcome = validator.validate(Some(&token)).await.unwrap();

        assert!(outcome.authenticated);
        assert_eq!(outcome.username.as_deref(), Some("jane_doe"));
    }

    #[tokio::test]
    async fn test_validation_is_idempotent() {
        let key = TestRsaKey::primary();
        let validator = validator_with(&[&key]);
        let token = AccessTokenBuilder::new(ISSUER).sign(&key);

        let first = validator.validate(Some(&token)).await.unwrap();
        let second = validator.validate(Some(&token)).await.unwrap();

        assert_eq!(first, second);
    }
}
