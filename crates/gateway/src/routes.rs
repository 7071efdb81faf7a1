//! The public JSON API.
//!
//! Endpoints:
//!
//! - `GET  /api/health`            — liveness probe
//! - `POST /api/chat`              — answer a question from the archive
//! - `GET  /api/knowledge`         — inspect the knowledge base
//! - `POST /api/knowledge/upsert`  — admin-gated knowledge edits
//! - `POST /api/checkout`          — create a subscription checkout session
//! - `POST /api/portal`            — create a billing-portal session
//!
//! Request bodies are parsed leniently (a malformed or absent body reads
//! as an empty object) so validation errors always come back in this
//! module's own `{error}` shape.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use gaian_core::{BillingError, KnowledgeError, SynthesisError};
use gaian_knowledge::compact;
use gaian_synthesis::{Strategy, resolve};

use crate::SharedState;

/// Byte cap for the knowledge preview shown in the UI.
const MAX_PREVIEW_BYTES: usize = 60_000;

/// Build the `/api` router.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/knowledge", get(knowledge_handler))
        .route("/api/knowledge/upsert", post(upsert_handler))
        .route("/api/checkout", post(checkout_handler))
        .route("/api/portal", post(portal_handler))
        .with_state(state)
}

// ── Error mapping ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// An error ready to leave the boundary: status code plus JSON body.
///
/// Taxonomy: missing/invalid request fields → 400, admin password
/// mismatch → 403, missing server-side configuration → 500, upstream
/// provider failure → 500 carrying the provider's own message.
struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                error: message.into(),
                detail: None,
            },
        }
    }

    fn unauthorized() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            body: ErrorResponse {
                error: "Unauthorized".into(),
                detail: None,
            },
        }
    }

    fn config(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse {
                error: message.into(),
                detail: None,
            },
        }
    }

    fn upstream(message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse {
                error: message.into(),
                detail,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<SynthesisError> for ApiError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::NotConfigured(setting) => Self::config(setting),
            other => Self::upstream(other.to_string(), None),
        }
    }
}

impl From<KnowledgeError> for ApiError {
    fn from(err: KnowledgeError) -> Self {
        match err {
            KnowledgeError::NotConfigured(setting) => Self::config(setting),
            other => Self::upstream(other.to_string(), None),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::NotConfigured(setting) => Self::config(setting),
            other => Self::upstream(other.to_string(), None),
        }
    }
}

/// Parse a request body the way the original service did: anything that
/// is not valid JSON reads as an empty object, so field validation (not
/// the framework) decides the response.
fn lenient_body<T: serde::de::DeserializeOwned + Default>(bytes: &Bytes) -> T {
    serde_json::from_slice(bytes).unwrap_or_default()
}

// ── Health ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    now: i64,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        now: chrono::Utc::now().timestamp_millis(),
    })
}

// ── Chat ──────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

async fn chat_handler(
    State(state): State<SharedState>,
    bytes: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let payload: ChatRequest = lenient_body(&bytes);

    let message = payload.message.unwrap_or_default();
    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("Missing message"));
    }

    let synthesizer = state
        .synthesizer
        .as_ref()
        .ok_or_else(|| ApiError::config("OPENAI_API_KEY not set"))?;

    // Only the context-injection strategy reads the store up front; the
    // retrieval strategy delegates lookup to the provider.
    let context_block = match synthesizer.strategy() {
        Strategy::ContextInjection => {
            let map = state.store.read().await?;
            compact(&map, state.config.synthesis.max_context_bytes)
        }
        Strategy::RetrievalTool => String::new(),
    };

    let result = synthesizer.synthesize(message, &context_block).await?;
    let response = resolve(
        &result,
        synthesizer.strategy(),
        state.config.synthesis.require_citations,
    );

    info!(question_len = message.len(), answer_len = response.len(), "Chat answered");
    Ok(Json(ChatResponse { response }))
}

// ── Knowledge ─────────────────────────────────────────────────────────────

async fn knowledge_handler(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    if state.store.name() == "vector" {
        let info = state.store.catalog().await?;
        // The preview is cosmetic; a failure there never fails the read.
        let preview = match state.store.preview(MAX_PREVIEW_BYTES).await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Knowledge preview failed, omitting");
                String::new()
            }
        };
        return Ok(Json(json!({ "info": info, "preview": preview })));
    }

    let map = state.store.read().await?;
    Ok(Json(json!({ "count": map.len(), "data": map })))
}

// ── Knowledge upsert (admin) ──────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct UpsertRequest {
    #[serde(default)]
    password: Option<String>,

    // File backend: one key/value pair
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    value: Option<Value>,

    // Vector backend: catalog actions
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "fileId")]
    file_id: Option<String>,
}

async fn upsert_handler(
    State(state): State<SharedState>,
    bytes: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload: UpsertRequest = lenient_body(&bytes);

    let expected = state
        .config
        .admin_password
        .as_deref()
        .ok_or_else(|| ApiError::config("ADMIN_PASSWORD not set"))?;

    if payload.password.as_deref() != Some(expected) {
        return Err(ApiError::unauthorized());
    }

    if state.store.name() == "vector" {
        return match payload.action.as_deref() {
            Some("add") => {
                let (Some(filename), Some(text)) = (payload.filename, payload.text) else {
                    return Err(ApiError::bad_request("Missing filename or text"));
                };
                let file_id = state.store.add_text_file(&filename, &text).await?;
                info!(filename, file_id = %file_id, "Knowledge file added");
                Ok(Json(json!({ "ok": true, "fileId": file_id.0 })))
            }
            Some("delete") => {
                let Some(file_id) = payload.file_id else {
                    return Err(ApiError::bad_request("Missing fileId"));
                };
                state.store.delete_file(&file_id).await?;
                info!(file_id, "Knowledge file deleted");
                Ok(Json(json!({ "ok": true })))
            }
            _ => Err(ApiError::bad_request("Missing or unknown action")),
        };
    }

    let (Some(key), Some(value)) = (payload.key, payload.value) else {
        return Err(ApiError::bad_request("Missing key or value"));
    };

    let mut map = state.store.read().await?;
    map.insert(key.clone(), value);
    state.store.write(&map).await?;

    info!(key, entries = map.len(), "Knowledge entry upserted");
    Ok(Json(json!({ "ok": true })))
}

// ── Billing ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct CheckoutRequest {
    #[serde(default, rename = "priceId")]
    price_id: Option<String>,
    #[serde(default, rename = "successPath")]
    success_path: Option<String>,
    #[serde(default, rename = "cancelPath")]
    cancel_path: Option<String>,
    #[serde(default, rename = "customerId")]
    customer_id: Option<String>,
}

#[derive(Serialize)]
struct SessionUrlResponse {
    url: String,
}

async fn checkout_handler(
    State(state): State<SharedState>,
    bytes: Bytes,
) -> Result<Json<SessionUrlResponse>, ApiError> {
    let payload: CheckoutRequest = lenient_body(&bytes);

    let billing = state
        .billing
        .as_ref()
        .ok_or_else(|| ApiError::config("STRIPE_SECRET_KEY not set"))?;

    let price_id = payload
        .price_id
        .or_else(|| state.config.stripe.price_id.clone())
        .ok_or_else(|| ApiError::bad_request("Missing priceId (or STRIPE_PRICE_ID_PRO)"))?;

    let origin = state.config.server.origin();
    let success_path = payload.success_path.as_deref().unwrap_or("/account");
    let cancel_path = payload.cancel_path.as_deref().unwrap_or("/pricing");

    let url = billing
        .create_checkout_session(&gaian_billing::CheckoutParams {
            price_id,
            success_url: format!("{origin}{success_path}?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{origin}{cancel_path}"),
            customer_id: payload.customer_id,
        })
        .await?;

    Ok(Json(SessionUrlResponse { url }))
}

#[derive(Deserialize, Default)]
struct PortalRequest {
    #[serde(default, rename = "customerId")]
    customer_id: Option<String>,
}

async fn portal_handler(
    State(state): State<SharedState>,
    bytes: Bytes,
) -> Result<Json<SessionUrlResponse>, ApiError> {
    let payload: PortalRequest = lenient_body(&bytes);

    let customer_id = payload
        .customer_id
        .ok_or_else(|| ApiError::bad_request("No customerId"))?;

    let billing = state
        .billing
        .as_ref()
        .ok_or_else(|| ApiError::config("STRIPE_SECRET_KEY not set"))?;

    let origin = state.config.server.origin();
    let url = billing
        .create_portal_session(&customer_id, &format!("{origin}/account"))
        .await?;

    Ok(Json(SessionUrlResponse { url }))
}

// ── Tests ─────────────────────────────────────────────────────────────────
