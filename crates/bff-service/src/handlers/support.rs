//! Support handlers.
//!
//! Operational endpoints exempt from authentication:
//!
//! - `/v1/pci-bff/support/healthcheck`: liveness - returns the app
//!   name/version if the process is running, no dependency checks
//! - `/v1/pci-bff/support/status`: adds the business-unit registry state
//!   so operators can see whether authorization data is loaded

use crate::models::{AppInfoResponse, APP_NAME, APP_VERSION};
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

/// Liveness handler.
///
/// Does NOT check any dependencies - failure means the process is
/// hung/deadlocked.
pub async fn health_check() -> Json<AppInfoResponse> {
    Json(AppInfoResponse {
        app_name: APP_NAME,
        app_version: APP_VERSION,
        business_units_loaded: None,
    })
}

/// Status handler.
///
/// Reports the app identity plus the number of business units currently
/// loaded in the registry. A zero count after startup means the registry
/// source is unavailable and scoped callers are being denied.
#[tracing::instrument(skip_all, name = "bff.handlers.status")]
pub async fn status_check(State(state): State<Arc<AppState>>) -> Json<AppInfoResponse> {
    let loaded = state.registry.len().await;

    Json(AppInfoResponse {
        app_name: APP_NAME,
        app_version: APP_VERSION,
        business_units_loaded: Some(loaded),
    })
}
