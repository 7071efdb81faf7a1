//! Thin client for the provider's Responses endpoint.
//!
//! One instance is built from configuration at process start and shared
//! for the life of the process; it is stateless apart from the pooled
//! HTTP connections. No retries — a failed call fails the whole inbound
//! request exactly once.

use serde_json::Value;
use tracing::{debug, warn};

use gaian_core::SynthesisError;

/// A shared, stateless client for `POST {base_url}/responses`.
pub struct ProviderClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ProviderClient {
    /// Create a new provider client.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Submit a request body to the Responses endpoint and return the
    /// raw response document.
    ///
    /// The response is kept as loose JSON on purpose: its schema varies
    /// across provider versions and the extraction chain deals with that.
    pub async fn respond(&self, body: &Value) -> Result<Value, SynthesisError> {
        let url = format!("{}/responses", self.base_url);

        debug!(model = %body["model"].as_str().unwrap_or("?"), "Sending synthesis request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            // Some provider stacks still gate tool_resources behind this.
            .header("OpenAI-Beta", "assistants=v2")
            .json(body)
            .send()
            .await
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return Err(SynthesisError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&error_body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(error_body);
            warn!(status, message = %message, "Provider returned error");
            return Err(SynthesisError::ApiError {
                status_code: status,
                message,
            });
        }

        response.json().await.map_err(|e| SynthesisError::ApiError {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        })
    }
}
