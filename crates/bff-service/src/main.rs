//! Pricing BFF
//!
//! Entry point for the pricing backend-for-frontend. Authenticates
//! browser sessions against the identity provider's key set, authorizes
//! callers against the business-unit registry and proxies pricing/batch
//! downstream APIs.

use bff_service::authz::{AuthorizationEngine, BusinessUnitRegistry};
use bff_service::config::Config;
use bff_service::observability::metrics::init_metrics_recorder;
use bff_service::repositories::PgBusinessUnitStore;
use bff_service::routes::{self, AppState};
use bff_service::services::{BatchServiceClient, CloudPricingClient};
use bff_service::tasks::spawn_registry_reload;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bff_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pricing BFF");

    // Load configuration - missing required variables are fatal here, never
    // surfaced as per-request errors
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        auth_jwks_url = %config.auth_jwks_url,
        registry_reload_seconds = config.registry_reload_seconds,
        "Configuration loaded successfully"
    );

    // Initialize database connection pool
    info!("Connecting to database...");
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    info!("Database connection established");

    // Business-unit registry with its data-access collaborator
    let store = Arc::new(PgBusinessUnitStore::new(db_pool));
    let registry = Arc::new(BusinessUnitRegistry::new(store));

    // Initial load; a failure leaves the registry empty (deny-all for
    // scoped callers) and the reload task retries on its next tick
    match registry.reload().await {
        Ok(count) => info!(business_units = count, "Business unit registry loaded"),
        Err(e) => error!("Initial business unit load failed: {}", e),
    }

    let engine = Arc::new(AuthorizationEngine::new(Arc::clone(&registry)));

    // Downstream clients
    let pricing_client = CloudPricingClient::new(config.cloud_pricing_url.clone())
        .map_err(|e| format!("Failed to build pricing client: {e}"))?;
    let batch_client = BatchServiceClient::new(config.batch_api_url.clone())
        .map_err(|e| format!("Failed to build batch client: {e}"))?;

    // Metrics recorder
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    // Background registry reload
    let shutdown_token = CancellationToken::new();
    let reload_task = spawn_registry_reload(
        Arc::clone(&registry),
        config.registry_reload_seconds,
        shutdown_token.clone(),
    );

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState {
        config,
        registry,
        engine,
        pricing_client,
        batch_client,
    });

    // Build application routes
    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Pricing BFF listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Stop the background reload loop
    shutdown_token.cancel();
    if let Err(e) = reload_task.await {
        warn!("Registry reload task ended abnormally: {}", e);
    }

    info!("Pricing BFF shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
