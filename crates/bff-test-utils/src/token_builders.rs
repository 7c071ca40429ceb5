//! Builder patterns for test data construction.
//!
//! Provides fluent APIs for creating provider-style access tokens and the
//! load balancer's user-claims documents.

use crate::crypto_fixtures::{b64url, TestRsaKey};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;

/// Builder for provider-style access tokens.
///
/// # Example
/// ```rust,ignore
/// let token = AccessTokenBuilder::new("https://idp.test/pool")
///     .for_subject("principal-001")
///     .with_username("CORP_jdoe")
///     .sign(&TestRsaKey::primary());
/// ```
pub struct AccessTokenBuilder {
    iss: String,
    token_use: String,
    sub: Option<String>,
    username: Option<String>,
    exp: i64,
    iat: i64,
}

impl AccessTokenBuilder {
    /// Create a builder for the given issuer with one-hour validity.
    pub fn new(issuer: &str) -> Self {
        let now = Utc::now();
        Self {
            iss: issuer.to_string(),
            token_use: "access".to_string(),
            sub: Some("test-principal".to_string()),
            username: Some("CORP_testuser".to_string()),
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Set the subject (principal id).
    pub fn for_subject(mut self, sub: &str) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Drop the subject claim entirely.
    pub fn without_subject(mut self) -> Self {
        self.sub = None;
        self
    }

    /// Set the composite `<domain-tag>_<username>` claim.
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    /// Drop the username claim entirely.
    pub fn without_username(mut self) -> Self {
        self.username = None;
        self
    }

    /// Override the `token_use` claim (`"access"` by default).
    pub fn with_token_use(mut self, token_use: &str) -> Self {
        self.token_use = token_use.to_string();
        self
    }

    /// Set expiration in seconds from now (negative for an expired token).
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Build the claims as a JSON value.
    pub fn claims(&self) -> serde_json::Value {
        let mut claims = json!({
            "iss": self.iss,
            "token_use": self.token_use,
            "exp": self.exp,
            "iat": self.iat,
        });
        if let Some(sub) = &self.sub {
            claims["sub"] = json!(sub);
        }
        if let Some(username) = &self.username {
            claims["username"] = json!(username);
        }
        claims
    }

    /// Sign the claims as an RS256 JWT under the key's kid.
    pub fn sign(&self, key: &TestRsaKey) -> String {
        sign_claims(&self.claims(), &key.kid, &key.encoding_key())
    }

    /// Sign with one key's material but another key's kid.
    ///
    /// Produces a token whose signature cannot verify against the key the
    /// header points at.
    pub fn sign_with_mismatched_kid(&self, signer: &TestRsaKey, advertised_kid: &str) -> String {
        sign_claims(&self.claims(), advertised_kid, &signer.encoding_key())
    }
}

fn sign_claims(claims: &serde_json::Value, kid: &str, key: &EncodingKey) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(kid.to_string());
    jsonwebtoken::encode(&header, claims, key).expect("test token signing must succeed")
}

/// Build an unsigned user-claims document in the edge proxy's JWT shape.
///
/// The service decodes (without verifying) the payload of this header, so a
/// placeholder signature is sufficient for tests.
pub fn user_claims_header(
    username: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
    business_unit: &str,
    roles: &str,
) -> String {
    let header = json!({"alg": "ES256", "typ": "JWT"});
    let payload = json!({
        "username": username,
        "email": email,
        "given_name": first_name,
        "family_name": last_name,
        "custom:jobtitle": "Pricing Analyst",
        "custom:bunit": business_unit,
        "custom:roles": roles,
    });
    format!(
        "{}.{}.{}",
        b64url(header.to_string().as_bytes()),
        b64url(payload.to_string().as_bytes()),
        b64url(b"unverified-test-signature")
    )
}
