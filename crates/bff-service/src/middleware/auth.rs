//! Request gatekeeper.
//!
//! Intercepts every inbound request before it reaches a route handler:
//!
//! - Allowlisted operational paths (health check, status, logout) bypass
//!   authentication entirely.
//! - The login path always proceeds to its handler, carrying whatever the
//!   validator produced - a browser-facing endpoint renders its own
//!   failure payload rather than receiving a hard 401.
//! - Every other path requires a valid token: rejections become 401
//!   responses carrying the validator's cause; validator infrastructure
//!   failures become 500 responses. "Not who you claim" and "we failed to
//!   check" are kept distinct.
//!
//! On success the assembled [`AuthContext`] is attached to the request
//! extensions for handlers and the authorization gate.

use crate::auth::{profile, TokenValidator};
use crate::authz::AuthorizationEngine;
use crate::errors::BffError;
use crate::models::{AuthContext, AuthOutcome};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// Health check path, exempt from authentication.
pub const HEALTH_CHECK_PATH: &str = "/v1/pci-bff/support/healthcheck";

/// Status path, exempt from authentication.
pub const STATUS_PATH: &str = "/v1/pci-bff/support/status";

/// Logout path, exempt from authentication.
pub const LOGOUT_PATH: &str = "/v1/pci-bff/auth/logout";

/// Login path; authenticated when possible, but never hard-rejected.
pub const LOGIN_PATH: &str = "/v1/pci-bff/auth/login";

/// Paths that bypass authentication entirely.
const ALLOWLISTED_PATHS: [&str; 3] = [HEALTH_CHECK_PATH, STATUS_PATH, LOGOUT_PATH];

/// State for the gatekeeper middleware.
#[derive(Clone)]
pub struct GatekeeperState {
    /// Token validator over the provider's key set.
    pub validator: Arc<TokenValidator>,

    /// Authorization engine used for user-details assembly.
    pub engine: Arc<AuthorizationEngine>,

    /// Header carrying the bearer access token.
    pub auth_token_header: String,

    /// Header carrying the edge proxy's user-claims document.
    pub user_claims_header: String,
}

/// Gatekeeper middleware applied to the whole router.
///
/// # Response
///
/// - Allowlisted path: proceeds with a bypassed context
/// - Valid token: proceeds with the identity context in extensions
/// - Rejected token on the login path: proceeds unauthenticated
/// - Rejected token elsewhere: 401 with the validator's cause
/// - Validator infrastructure failure: 500 with a generic message
#[instrument(skip_all, name = "bff.middleware.gatekeeper")]
pub async fn gatekeeper(
    State(state): State<Arc<GatekeeperState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, BffError> {
    let path = req.uri().path();
    if ALLOWLISTED_PATHS.contains(&path) {
        tracing::debug!(target: "bff.middleware.gatekeeper", path = %path, "Authentication not required");
        req.extensions_mut().insert(AuthContext::bypassed());
        return Ok(next.run(req).await);
    }

    let is_login = path == LOGIN_PATH;
    let token = header_value(&req, &state.auth_token_header);
    let claims_document = header_value(&req, &state.user_claims_header);

    let outcome = match state.validator.validate(token.as_deref()).await {
        Ok(outcome) => outcome,
        Err(e) if is_login => {
            // The login page renders its own failure state even when the
            // check itself broke.
            tracing::error!(target: "bff.middleware.gatekeeper", error = %e, "Authorization interceptor failed");
            req.extensions_mut().insert(AuthContext {
                outcome: AuthOutcome::rejected("Authorization interceptor failed"),
                user_details: None,
            });
            return Ok(next.run(req).await);
        }
        Err(e) => return Err(e),
    };

    if outcome.authenticated {
        let user_details = match outcome.username.as_deref() {
            Some(username) => {
                profile::assemble_user_details(&state.engine, claims_document.as_deref(), username)
                    .await
            }
            None => None,
        };
        req.extensions_mut().insert(AuthContext {
            outcome,
            user_details,
        });
        return Ok(next.run(req).await);
    }

    if is_login {
        req.extensions_mut().insert(AuthContext {
            outcome,
            user_details: None,
        });
        return Ok(next.run(req).await);
    }

    let cause = outcome
        .cause
        .unwrap_or_else(|| "User cannot be authenticated".to_string());
    Err(BffError::Unauthenticated(cause))
}

/// Read a header as an owned string, if present and valid UTF-8.
fn header_value(req: &Request, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(ToString::to_string)
}
