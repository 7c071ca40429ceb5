//! Cloud pricing HTTP client.
//!
//! Proxies price lookups to the cloud pricing engine's `product-prices`
//! and `pci-prices` endpoints. Request bodies are shaped from the
//! frontend's pricing request; responses are passed through verbatim.
//!
//! # Security
//!
//! - All requests carry a fresh correlation id for cross-service tracing
//! - Timeouts prevent hanging connections
//! - Upstream errors are logged server-side and surfaced with the
//!   upstream's error code

use crate::errors::BffError;
use crate::models::PricingDataRequest;
use serde_json::json;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

/// Timeout for pricing requests in seconds.
const PRICING_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client identifier sent with every pricing request.
const CLIENT_ID: &str = "Cloud-PCI";

/// Price engine selector header value.
const PRICE_ENGINE_TYPE: &str = "CP";

/// Correlation id header propagated to the pricing engine.
const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Endpoint for full product price views.
const PRODUCT_PRICES_ENDPOINT: &str = "product-prices";

/// Endpoint for pci (customer-contextual) price views.
const PCI_PRICES_ENDPOINT: &str = "pci-prices";

/// HTTP client for the cloud pricing engine.
#[derive(Clone)]
pub struct CloudPricingClient {
    /// HTTP client with configured timeouts.
    client: reqwest::Client,

    /// Base URL of the pricing API.
    base_url: String,
}

impl CloudPricingClient {
    /// Create a new pricing client.
    ///
    /// # Errors
    ///
    /// Returns `BffError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: String) -> Result<Self, BffError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PRICING_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                tracing::error!(target: "bff.services.pricing", error = %e, "Failed to build HTTP client");
                BffError::Internal
            })?;

        Ok(Self { client, base_url })
    }

    /// Fetch product prices for the requested product.
    ///
    /// # Errors
    ///
    /// Returns `BffError::UpstreamPricing` when the pricing engine fails.
    #[instrument(skip_all, name = "bff.services.pricing.product_prices")]
    pub async fn product_prices(
        &self,
        request: &PricingDataRequest,
    ) -> Result<serde_json::Value, BffError> {
        let body = json!({
            "businessUnitNumber": request.business_unit_number,
            "customerAccount": request.customer_account,
            "priceRequestDate": request.price_request_date,
            "products": [request.product],
        });

        self.send(PRODUCT_PRICES_ENDPOINT, &body).await
    }

    /// Fetch pci prices for the requested product and quantity.
    ///
    /// # Errors
    ///
    /// Returns `BffError::UpstreamPricing` when the pricing engine fails.
    #[instrument(skip_all, name = "bff.services.pricing.pci_prices")]
    pub async fn pci_prices(
        &self,
        request: &PricingDataRequest,
    ) -> Result<serde_json::Value, BffError> {
        let mut product = request.product.clone();
        if let Some(quantity) = request.requested_quantity {
            if let Some(product_object) = product.as_object_mut() {
                product_object.insert("quantity".to_string(), json!(quantity.to_string()));
            }
        }

        let body = json!({
            "businessUnitNumber": request.business_unit_number,
            "customerAccount": request.customer_account,
            "priceRequestDate": request.price_request_date,
            "products": [product],
        });

        self.send(PCI_PRICES_ENDPOINT, &body).await
    }

    /// POST a pricing request and surface upstream errors.
    async fn send(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, BffError> {
        let url = format!("{}/v1/pricing/{endpoint}", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("clientID", CLIENT_ID)
            .header("priceEngineType", PRICE_ENGINE_TYPE)
            .header(CORRELATION_ID_HEADER, Uuid::new_v4().to_string())
            .json(body)
            .send()
            .await
            .map_err(|e| BffError::UpstreamPricing {
                message: format!("request to {endpoint} failed: {e}"),
                code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            // The pricing engine returns a structured {code, message} body
            let error_body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = error_body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("upstream returned an error")
                .to_string();
            let code = error_body.get("code").and_then(serde_json::Value::as_i64);

            return Err(BffError::UpstreamPricing { message, code });
        }

        response.json().await.map_err(|e| BffError::UpstreamPricing {
            message: format!("malformed response from {endpoint}: {e}"),
            code: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pricing_request() -> PricingDataRequest {
        PricingDataRequest {
            business_unit_number: "001".to_string(),
            customer_account: "700001".to_string(),
            price_request_date: "20240801".to_string(),
            product: json!({"supc": "1000001", "splitFlag": false}),
            requested_quantity: Some(4),
        }
    }

    #[tokio::test]
    async fn test_product_prices_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pricing/product-prices"))
            .and(header_exists("clientID"))
            .and(header_exists("X-Correlation-Id"))
            .and(body_partial_json(json!({"businessUnitNumber": "001"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"prices": [{"unitPrice": 10.5}]})),
            )
            .mount(&server)
            .await;

        let client = CloudPricingClient::new(server.uri()).unwrap();
        let data = client.product_prices(&pricing_request()).await.unwrap();

        assert_eq!(data["prices"][0]["unitPrice"], 10.5);
    }

    #[tokio::test]
    async fn test_pci_prices_injects_quantity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pricing/pci-prices"))
            .and(body_partial_json(
                json!({"products": [{"supc": "1000001", "quantity": "4"}]}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prices": []})))
            .mount(&server)
            .await;

        let client = CloudPricingClient::new(server.uri()).unwrap();
        let result = client.pci_prices(&pricing_request()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_upstream_error_carries_code_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pricing/product-prices"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": 4002, "message": "price not found"})),
            )
            .mount(&server)
            .await;

        let client = CloudPricingClient::new(server.uri()).unwrap();
        let result = client.product_prices(&pricing_request()).await;

        match result {
            Err(BffError::UpstreamPricing { message, code }) => {
                assert_eq!(message, "price not found");
                assert_eq!(code, Some(4002));
            }
            other => panic!("Expected UpstreamPricing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_upstream_error() {
        // Port 9 is discard; connection will be refused
        let client = CloudPricingClient::new("http://127.0.0.1:9".to_string()).unwrap();
        let result = client.product_prices(&pricing_request()).await;

        assert!(matches!(result, Err(BffError::UpstreamPricing { .. })));
    }
}
