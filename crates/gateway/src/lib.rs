//! HTTP API gateway for Gaian Archive.
//!
//! Exposes the public JSON API: chat against the knowledge base,
//! knowledge inspection and admin upsert, and billing session creation.
//! Serves the embedded chat frontend at `/`.
//!
//! Built on Axum. Every handler is a thin shell: validate the body,
//! invoke one subsystem, map the outcome onto a status code. Requests
//! are independent — no shared mutable state beyond the knowledge store
//! itself, no locking, no retries.

pub mod frontend;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;
use tracing::info;

use gaian_billing::BillingClient;
use gaian_config::AppConfig;
use gaian_core::KnowledgeStore;
use gaian_synthesis::Synthesizer;

/// Shared application state for the gateway.
///
/// Clients are constructed once from configuration at startup and
/// reused; a missing credential leaves the corresponding slot `None`
/// and the affected endpoints report the missing setting per request.
pub struct GatewayState {
    pub config: AppConfig,
    pub store: Arc<dyn KnowledgeStore>,
    pub synthesizer: Option<Synthesizer>,
    pub billing: Option<BillingClient>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the gateway state from configuration.
pub fn build_state(config: AppConfig) -> Result<SharedState, Box<dyn std::error::Error>> {
    let store = gaian_knowledge::build_from_config(&config)?;

    let synthesizer = match Synthesizer::from_config(&config) {
        Ok(s) => Some(s),
        Err(e) => {
            info!(reason = %e, "Synthesis disabled until configured");
            None
        }
    };

    let billing = config
        .stripe
        .secret_key
        .as_ref()
        .map(|key| BillingClient::new(key.clone(), &config.stripe.base_url));

    Ok(Arc::new(GatewayState {
        config,
        store,
        synthesizer,
        billing,
    }))
}

/// Build the Axum router with all gateway routes and layers.
///
/// Layers applied:
/// - Request body size limit (1 MB)
/// - Permissive-method CORS for the JSON API
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    routes::api_router(state)
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config)?;
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
