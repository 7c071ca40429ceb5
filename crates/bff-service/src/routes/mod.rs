//! HTTP routes for the Pricing BFF.
//!
//! Defines the Axum router and application state. Every component is
//! explicitly constructed and injected here - there is no module-level
//! shared state.

use crate::auth::{KeySetClient, TokenValidator};
use crate::authz::{AuthorizationEngine, BusinessUnitRegistry};
use crate::config::Config;
use crate::handlers;
use crate::middleware::{
    gatekeeper, GatekeeperState, HEALTH_CHECK_PATH, LOGIN_PATH, LOGOUT_PATH, STATUS_PATH,
};
use crate::services::{BatchServiceClient, CloudPricingClient};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

// Re-exported so binaries and integration tests share one recorder setup.
pub use crate::observability::metrics::init_metrics_recorder;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Business-unit registry snapshot.
    pub registry: Arc<BusinessUnitRegistry>,

    /// Authorization engine over the registry.
    pub engine: Arc<AuthorizationEngine>,

    /// Cloud pricing client.
    pub pricing_client: CloudPricingClient,

    /// Batch file-service client.
    pub batch_client: BatchServiceClient,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - support endpoints (allowlisted by the gatekeeper)
/// - auth flow endpoints (login special-cased, logout allowlisted)
/// - pricing and batch proxy endpoints (authenticated)
/// - `/metrics` Prometheus endpoint (outside the gatekeeper)
/// - TraceLayer for request logging and a 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    // Create the key-set client and token validator
    let key_set = Arc::new(KeySetClient::new(state.config.auth_jwks_url.clone()));
    let validator = Arc::new(TokenValidator::new(
        key_set,
        state.config.auth_token_issuer.clone(),
    ));
    let gatekeeper_state = Arc::new(GatekeeperState {
        validator,
        engine: Arc::clone(&state.engine),
        auth_token_header: state.config.auth_token_header.clone(),
        user_claims_header: state.config.user_claims_header.clone(),
    });

    // Every application route passes the gatekeeper; the allowlist and the
    // login special case live inside it, keeping the route table flat.
    let api_routes = Router::new()
        .route(HEALTH_CHECK_PATH, get(handlers::health_check))
        .route(STATUS_PATH, get(handlers::status_check))
        .route(LOGIN_PATH, get(handlers::login))
        .route(LOGOUT_PATH, get(handlers::logout))
        .route("/v1/pci-bff/auth/user-details", get(handlers::user_details))
        .route(
            "/v1/pci-bff/pricing/pricing-data",
            post(handlers::pricing_data),
        )
        .route(
            "/v1/pci-bff/batch/signed-url/:source",
            post(handlers::batch_signed_urls),
        )
        .route(
            "/v1/pci-bff/batch/files/:source",
            get(handlers::batch_list_files).delete(handlers::batch_delete_files),
        )
        .route("/v1/pci-bff/batch/jobs", get(handlers::batch_list_jobs))
        .route_layer(middleware::from_fn_with_state(gatekeeper_state, gatekeeper))
        .with_state(state);

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
