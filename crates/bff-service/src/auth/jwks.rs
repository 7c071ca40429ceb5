//! Key-set client for the identity provider's published signing keys.
//!
//! Downloads the provider's JWKS document and transforms each published RSA
//! key into a verification key keyed by `kid`. The set is fetched once and
//! memoized for the process lifetime: the provider's keys outlive any
//! deployment of this service, so a rotation is picked up by the next
//! restart.
//!
//! # Security
//!
//! - A fetch or parse failure is an infrastructure error
//!   (`BffError::KeySetFetch`), never an authentication decision
//! - A kid with no matching key is `Ok(None)`: the caller rejects the
//!   token without attempting signature verification

use crate::errors::BffError;
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::instrument;

/// Timeout for the key-set fetch.
const KEY_SET_FETCH_TIMEOUT_SECS: u64 = 10;

/// A single published key entry from the provider's JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishedKey {
    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// RSA modulus (base64url encoded).
    pub n: String,

    /// RSA public exponent (base64url encoded).
    pub e: String,

    /// Key type (must be "RSA").
    pub kty: String,
}

/// JWKS response from the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct KeySetResponse {
    /// List of published keys.
    pub keys: Vec<PublishedKey>,
}

/// Client for fetching and memoizing the provider's verification keys.
///
/// Thread-safe: the key map is populated at most once on the success path
/// and replaced wholesale, so concurrent readers see either nothing or the
/// complete set.
pub struct KeySetClient {
    /// URL to the provider's JWKS document.
    jwks_url: String,

    /// HTTP client for fetching the key set.
    http_client: reqwest::Client,

    /// Memoized verification keys, `None` until the first successful fetch.
    keys: RwLock<Option<HashMap<String, DecodingKey>>>,
}

impl KeySetClient {
    /// Create a new key-set client for the given JWKS URL.
    #[must_use]
    pub fn new(jwks_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(KEY_SET_FETCH_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "bff.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            keys: RwLock::new(None),
        }
    }

    /// Get a verification key by key ID.
    ///
    /// Populates the key set on first use. A missing kid after a successful
    /// load is `Ok(None)` - an authentication rejection belongs to the
    /// caller, not this client.
    ///
    /// # Errors
    ///
    /// Returns `BffError::KeySetFetch` if the key set cannot be fetched or
    /// the document is malformed.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Option<DecodingKey>, BffError> {
        {
            let keys = self.keys.read().await;
            if let Some(loaded) = keys.as_ref() {
                return Ok(loaded.get(kid).cloned());
            }
        }

        self.load().await?;

        let keys = self.keys.read().await;
        Ok(keys.as_ref().and_then(|loaded| loaded.get(kid).cloned()))
    }

    /// Populate the key set, fetching at most once.
    ///
    /// The write guard is held across the fetch so that racing first
    /// callers cannot issue duplicate downloads.
    async fn load(&self) -> Result<(), BffError> {
        let mut keys = self.keys.write().await;
        if keys.is_some() {
            return Ok(());
        }

        let fetched = self.fetch_key_set().await?;
        tracing::info!(
            target: "bff.auth.jwks",
            key_count = fetched.len(),
            "Key set loaded"
        );
        *keys = Some(fetched);
        Ok(())
    }

    /// Fetch the JWKS document and transform it into verification keys.
    async fn fetch_key_set(&self) -> Result<HashMap<String, DecodingKey>, BffError> {
        tracing::debug!(target: "bff.auth.jwks", url = %self.jwks_url, "Fetching key set from identity provider");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| BffError::KeySetFetch(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(BffError::KeySetFetch(format!(
                "key set endpoint returned {}",
                response.status()
            )));
        }

        let key_set: KeySetResponse = response
            .json()
            .await
            .map_err(|e| BffError::KeySetFetch(format!("malformed key set document: {e}")))?;

        let mut keys = HashMap::with_capacity(key_set.keys.len());
        for published in key_set.keys {
            if published.kty != "RSA" {
                return Err(BffError::KeySetFetch(format!(
                    "unsupported key type '{}' for kid '{}'",
                    published.kty, published.kid
                )));
            }

            let key = DecodingKey::from_rsa_components(&published.n, &published.e).map_err(
                |e| {
                    BffError::KeySetFetch(format!(
                        "invalid RSA components for kid '{}': {e}",
                        published.kid
                    ))
                },
            )?;
            keys.insert(published.kid, key);
        }

        Ok(keys)
    }

    /// Build a client with keys already in place, bypassing the fetch.
    #[cfg(test)]
    pub(crate) fn preloaded(keys: HashMap<String, DecodingKey>) -> Self {
        Self {
            jwks_url: "http://localhost/.well-known/jwks.json".to_string(),
            http_client: reqwest::Client::new(),
            keys: RwLock::new(Some(keys)),
        }
    }
}
