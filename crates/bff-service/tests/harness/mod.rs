//! Shared integration test harness.
//!
//! Spins up the full router on an ephemeral port with wiremock standing in
//! for the identity provider's JWKS endpoint and the downstream pricing
//! and batch APIs. The business-unit store is injected in memory, so no
//! database is required.

#![allow(dead_code)] // Each test binary uses a subset of the harness
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use bff_service::authz::{AuthorizationEngine, BusinessUnitRegistry};
use bff_service::config::Config;
use bff_service::models::BusinessUnit;
use bff_service::repositories::mock::StaticBusinessUnitStore;
use bff_service::routes::{self, init_metrics_recorder, AppState};
use bff_service::services::{BatchServiceClient, CloudPricingClient};
use bff_test_utils::{jwks_document, user_claims_header, AccessTokenBuilder, TestRsaKey};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Issuer every test token is minted for.
pub const TEST_ISSUER: &str = "https://idp.test/pool-1";

/// Global metrics handle for test servers - the Prometheus recorder can
/// only be installed once per process.
static TEST_METRICS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
    OnceLock::new();

fn test_metrics_handle() -> metrics_exporter_prometheus::PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder().unwrap_or_else(|_| {
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle()
            })
        })
        .clone()
}

/// The default business-unit fixture set.
pub fn fixture_units() -> Vec<BusinessUnit> {
    vec![
        BusinessUnit::new("001", "Jackson Division", true),
        BusinessUnit::new("002", "Atlanta Division", false),
        BusinessUnit::new("003", "Jacksonville Division", true),
        BusinessUnit::new("004", "Central California Division", false),
        BusinessUnit::new("005", "Intermountain Division", false),
    ]
}

/// A running BFF with mocked collaborators.
pub struct TestBffServer {
    pub addr: SocketAddr,
    server_handle: JoinHandle<()>,
    pub jwks_server: MockServer,
    pub pricing_server: MockServer,
    pub batch_server: MockServer,
    pub key: TestRsaKey,
}

impl TestBffServer {
    /// Spawn with a healthy JWKS endpoint serving the primary test key.
    pub async fn spawn(units: Vec<BusinessUnit>) -> Result<Self> {
        Self::spawn_inner(units, false).await
    }

    /// Spawn with a JWKS endpoint that always fails.
    pub async fn spawn_with_broken_jwks(units: Vec<BusinessUnit>) -> Result<Self> {
        Self::spawn_inner(units, true).await
    }

    async fn spawn_inner(units: Vec<BusinessUnit>, broken_jwks: bool) -> Result<Self> {
        let jwks_server = MockServer::start().await;
        let pricing_server = MockServer::start().await;
        let batch_server = MockServer::start().await;
        let key = TestRsaKey::primary();

        if broken_jwks {
            Mock::given(method("GET"))
                .and(path("/.well-known/jwks.json"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&jwks_server)
                .await;
        } else {
            Mock::given(method("GET"))
                .and(path("/.well-known/jwks.json"))
                .respond_with(ResponseTemplate::new(200).set_body_json(jwks_document(&[&key])))
                .mount(&jwks_server)
                .await;
        }

        let vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://test/test".to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("AUTH_TOKEN_ISSUER".to_string(), TEST_ISSUER.to_string()),
            (
                "AUTH_JWKS_URL".to_string(),
                format!("{}/.well-known/jwks.json", jwks_server.uri()),
            ),
            (
                "FRONTEND_URL".to_string(),
                "https://pricing.test/app".to_string(),
            ),
            (
                "LOGOUT_REDIRECT_URL".to_string(),
                "https://idp.test/logout".to_string(),
            ),
            ("CLOUD_PRICING_URL".to_string(), pricing_server.uri()),
            ("BATCH_API_URL".to_string(), batch_server.uri()),
        ]);
        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let store = Arc::new(StaticBusinessUnitStore::with_units(units));
        let registry = Arc::new(BusinessUnitRegistry::new(store));
        registry
            .reload()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load registry: {}", e))?;
        let engine = Arc::new(AuthorizationEngine::new(Arc::clone(&registry)));

        let pricing_client = CloudPricingClient::new(config.cloud_pricing_url.clone())
            .map_err(|e| anyhow::anyhow!("Failed to build pricing client: {}", e))?;
        let batch_client = BatchServiceClient::new(config.batch_api_url.clone())
            .map_err(|e| anyhow::anyhow!("Failed to build batch client: {}", e))?;

        let state = Arc::new(AppState {
            config,
            registry,
            engine,
            pricing_client,
            batch_client,
        });

        let app = routes::build_routes(state, test_metrics_handle());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let server_handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {e}");
            }
        });

        Ok(Self {
            addr,
            server_handle,
            jwks_server,
            pricing_server,
            batch_server,
            key,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A token the server accepts: right issuer, access use, composite
    /// username, signed by the advertised key.
    pub fn valid_token(&self) -> String {
        AccessTokenBuilder::new(TEST_ISSUER)
            .for_subject("principal-001")
            .with_username("CORP_jdoe")
            .sign(&self.key)
    }

    /// A user-claims header document for the given attribute and roles.
    pub fn claims_header(&self, business_unit: &str, roles: &str) -> String {
        user_claims_header(
            "jdoe",
            "jane.doe@example.com",
            "Jane",
            "Doe",
            business_unit,
            roles,
        )
    }

    /// Number of requests the JWKS mock has served.
    pub async fn jwks_fetch_count(&self) -> usize {
        self.jwks_server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

impl Drop for TestBffServer {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

/// A reqwest client that does not follow redirects, so login/logout
/// responses can be asserted directly.
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client must build")
}
