//! Pricing BFF configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output. Missing required variables are
//! fatal at startup - configuration problems are never surfaced as
//! per-request errors.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default header carrying the bearer access token.
pub const DEFAULT_AUTH_TOKEN_HEADER: &str = "x-amzn-oidc-accesstoken";

/// Default header carrying the edge proxy's user-claims document.
pub const DEFAULT_USER_CLAIMS_HEADER: &str = "x-amzn-oidc-data";

/// Default registry reload interval in seconds.
pub const DEFAULT_REGISTRY_RELOAD_SECONDS: u64 = 300;

/// Pricing BFF configuration.
///
/// Loaded from environment variables with sensible defaults.
/// Database URL is redacted in Debug output to prevent credential leakage.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL for the business-unit source of truth.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Expected `iss` claim of inbound access tokens.
    pub auth_token_issuer: String,

    /// URL of the provider's published key-set document.
    /// Defaults to `<issuer>/.well-known/jwks.json`.
    pub auth_jwks_url: String,

    /// Request header carrying the bearer access token.
    pub auth_token_header: String,

    /// Request header carrying the edge proxy's user-claims document.
    pub user_claims_header: String,

    /// Frontend URL the login flow redirects back to.
    pub frontend_url: String,

    /// Provider logout URL the logout flow redirects to.
    pub logout_redirect_url: String,

    /// Base URL of the cloud pricing API.
    pub cloud_pricing_url: String,

    /// Base URL of the batch file API.
    pub batch_api_url: String,

    /// Business-unit registry reload interval in seconds.
    pub registry_reload_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("auth_token_issuer", &self.auth_token_issuer)
            .field("auth_jwks_url", &self.auth_jwks_url)
            .field("auth_token_header", &self.auth_token_header)
            .field("user_claims_header", &self.user_claims_header)
            .field("frontend_url", &self.frontend_url)
            .field("logout_redirect_url", &self.logout_redirect_url)
            .field("cloud_pricing_url", &self.cloud_pricing_url)
            .field("batch_api_url", &self.batch_api_url)
            .field("registry_reload_seconds", &self.registry_reload_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid registry reload interval: {0}")]
    InvalidReloadInterval(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a
    /// numeric variable fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a
    /// numeric variable fails validation.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let auth_token_issuer = vars
            .get("AUTH_TOKEN_ISSUER")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_TOKEN_ISSUER".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let auth_jwks_url = vars
            .get("AUTH_JWKS_URL")
            .cloned()
            .unwrap_or_else(|| format!("{auth_token_issuer}/.well-known/jwks.json"));

        let auth_token_header = vars
            .get("AUTH_TOKEN_HEADER")
            .cloned()
            .unwrap_or_else(|| DEFAULT_AUTH_TOKEN_HEADER.to_string());

        let user_claims_header = vars
            .get("USER_CLAIMS_HEADER")
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_CLAIMS_HEADER.to_string());

        let frontend_url = vars
            .get("FRONTEND_URL")
            .cloned()
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        let logout_redirect_url = vars
            .get("LOGOUT_REDIRECT_URL")
            .cloned()
            .unwrap_or_else(|| frontend_url.clone());

        let cloud_pricing_url = vars
            .get("CLOUD_PRICING_URL")
            .cloned()
            .unwrap_or_else(|| "http://localhost:8091".to_string());

        let batch_api_url = vars
            .get("BATCH_API_URL")
            .cloned()
            .unwrap_or_else(|| "http://localhost:8092".to_string());

        // Parse registry reload interval with validation
        let registry_reload_seconds =
            if let Some(value_str) = vars.get("REGISTRY_RELOAD_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidReloadInterval(format!(
                        "REGISTRY_RELOAD_SECONDS must be a valid positive integer, got '{value_str}': {e}"
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidReloadInterval(
                        "REGISTRY_RELOAD_SECONDS must be greater than 0".to_string(),
                    ));
                }

                value
            } else {
                DEFAULT_REGISTRY_RELOAD_SECONDS
            };

        Ok(Config {
            database_url,
            bind_address,
            auth_token_issuer,
            auth_jwks_url,
            auth_token_header,
            user_claims_header,
            frontend_url,
            logout_redirect_url,
            cloud_pricing_url,
            batch_api_url,
            registry_reload_seconds,
        })
    }
}
