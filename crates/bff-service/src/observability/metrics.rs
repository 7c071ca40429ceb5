//! Metrics definitions for the Pricing BFF.
//!
//! All metrics follow Prometheus naming conventions:
//! - `bff_` prefix for this service
//! - `_total` suffix for counters
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion: the auth outcome
//! label carries only `authenticated`/`rejected`, never the cause string.

use crate::models::AuthOutcome;
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder and return the handle for
/// serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder fails to install (e.g.,
/// already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record a token validation outcome.
///
/// Metric: `bff_auth_attempts_total`
/// Labels: `outcome` (`authenticated` | `rejected`)
pub fn record_auth_outcome(outcome: &AuthOutcome) {
    let label = if outcome.authenticated {
        "authenticated"
    } else {
        "rejected"
    };
    counter!("bff_auth_attempts_total", "outcome" => label).increment(1);
}

/// Record a business-unit registry reload.
///
/// Metrics: `bff_registry_reloads_total`, `bff_business_units_loaded`
pub fn record_registry_reload(count: usize) {
    counter!("bff_registry_reloads_total").increment(1);
    #[allow(clippy::cast_precision_loss)]
    gauge!("bff_business_units_loaded").set(count as f64);
}
