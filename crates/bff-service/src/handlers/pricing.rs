//! Pricing data handler.
//!
//! The one route where authorization has teeth: the requested business
//! unit must appear in the caller's authorized list before anything is
//! proxied to the pricing engine.

use crate::authz::AuthorizationEngine;
use crate::errors::BffError;
use crate::models::{AggregatedPricingResponse, AuthContext, PricingDataRequest};
use crate::routes::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /v1/pci-bff/pricing/pricing-data
///
/// Gates the request on the caller's authorized business units, then
/// fetches the product and pci price views concurrently and returns the
/// aggregate.
///
/// # Errors
///
/// - 401 `BffError::UnauthorizedBusinessUnit` when the requested unit is
///   not in the caller's authorized list
/// - 400 `BffError::UpstreamPricing` when the pricing engine fails
#[instrument(skip_all, name = "bff.handlers.pricing_data")]
pub async fn pricing_data(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<AuthContext>,
    Json(request): Json<PricingDataRequest>,
) -> Result<Json<AggregatedPricingResponse>, BffError> {
    if !AuthorizationEngine::is_authorized_request(&context, &request.business_unit_number) {
        return Err(BffError::UnauthorizedBusinessUnit);
    }

    let (product_prices, pci_prices) = tokio::join!(
        state.pricing_client.product_prices(&request),
        state.pricing_client.pci_prices(&request),
    );

    let response = AggregatedPricingResponse {
        product_prices: product_prices?,
        pci_prices: pci_prices?,
    };

    tracing::debug!(target: "bff.handlers.pricing", "Aggregated pricing response assembled");
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    // The gate itself is covered by the authorization engine unit tests;
    // end-to-end request gating (401 body shape, upstream aggregation)
    // lives in the integration tests.
}
