//! Auth flow handlers.
//!
//! These endpoints serve the browser login flow. The gatekeeper never
//! hard-rejects the login path, so `login` itself renders the failure
//! payload the frontend expects; `logout` is allowlisted and only clears
//! the edge session cookies before redirecting to the provider.

use crate::errors::BffError;
use crate::models::{AuthContext, LoginFailureResponse, UserDetails};
use crate::routes::AppState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Edge session cookies cleared on logout.
const AUTH_SESSION_COOKIES: [&str; 2] = ["ELBAuthSessionCookie-0", "ELBAuthSessionCookie-1"];

/// Handler for GET /v1/pci-bff/auth/login
///
/// Browser calls land here after the edge proxy completes the provider
/// login. An authenticated caller is sent back to the frontend; an
/// unauthenticated one receives a renderable failure payload instead of a
/// hard 401.
#[instrument(skip_all, name = "bff.handlers.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<AuthContext>,
) -> Response {
    if context.outcome.authenticated {
        tracing::debug!(target: "bff.handlers.login", "Login completed, redirecting to frontend");
        return Redirect::to(&state.config.frontend_url).into_response();
    }

    Json(LoginFailureResponse {
        authenticated: false,
        cause: context.outcome.cause,
    })
    .into_response()
}

/// Handler for GET /v1/pci-bff/auth/logout
///
/// Expires the edge session cookies and redirects to the provider's
/// logout URL. Allowlisted: an expired session must still be able to log
/// out.
#[instrument(skip_all, name = "bff.handlers.logout")]
pub async fn logout(State(state): State<Arc<AppState>>) -> Response {
    let mut response = Redirect::to(&state.config.logout_redirect_url).into_response();

    for name in AUTH_SESSION_COOKIES {
        if let Ok(value) = format!("{name}=; Max-Age=0; Path=/; Secure; HttpOnly").parse() {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

/// Handler for GET /v1/pci-bff/auth/user-details
///
/// Returns the assembled user details for the authenticated caller.
///
/// # Errors
///
/// Returns 401 when the caller carries no user-details payload (e.g. the
/// edge proxy's claims header was missing).
#[instrument(skip_all, name = "bff.handlers.user_details")]
pub async fn user_details(
    Extension(context): Extension<AuthContext>,
) -> Result<Json<UserDetails>, BffError> {
    context.user_details.map(Json).ok_or_else(|| {
        BffError::Unauthenticated("User details are not available for the session".to_string())
    })
}
