//! Subscription billing for Gaian Archive — checkout and billing-portal
//! session creation against the payments provider.
//!
//! The provider speaks form-encoded bodies; both operations are single
//! outbound calls that return a redirect URL. No retries, no webhooks —
//! subscription state lives entirely provider-side.

use serde::Deserialize;
use tracing::{debug, warn};

use gaian_core::BillingError;

/// A shared, stateless client for the payments API.
pub struct BillingClient {
    base_url: String,
    secret_key: String,
    client: reqwest::Client,
}

/// Parameters for creating a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    /// Subscription price identifier.
    pub price_id: String,
    /// Full redirect URL on success. May contain the provider's
    /// `{CHECKOUT_SESSION_ID}` placeholder.
    pub success_url: String,
    /// Full redirect URL on cancel.
    pub cancel_url: String,
    /// Existing customer to attach, if known.
    pub customer_id: Option<String>,
}

impl BillingClient {
    /// Create a new billing client.
    pub fn new(secret_key: impl Into<String>, base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            client,
        }
    }

    /// Create a subscription checkout session; returns the hosted URL.
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<String, BillingError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "subscription".into()),
            ("payment_method_types[0]".into(), "card".into()),
            ("allow_promotion_codes".into(), "true".into()),
            ("line_items[0][price]".into(), params.price_id.clone()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("success_url".into(), params.success_url.clone()),
            ("cancel_url".into(), params.cancel_url.clone()),
        ];
        if let Some(customer) = &params.customer_id {
            form.push(("customer".into(), customer.clone()));
        }

        let session = self.post_session("checkout/sessions", &form).await?;
        debug!(price = %params.price_id, "Checkout session created");
        Ok(session.url)
    }

    /// Create a billing-portal session for an existing customer; returns
    /// the hosted URL.
    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, BillingError> {
        let form: Vec<(String, String)> = vec![
            ("customer".into(), customer_id.into()),
            ("return_url".into(), return_url.into()),
        ];

        let session = self.post_session("billing_portal/sessions", &form).await?;
        debug!(customer = %customer_id, "Portal session created");
        Ok(session.url)
    }

    async fn post_session(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<SessionResponse, BillingError> {
        let url = format!("{}/{path}", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .form(form)
            .send()
            .await
            .map_err(|e| BillingError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&error_body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(error_body);
            warn!(status, message = %message, "Payments provider returned error");
            return Err(BillingError::ApiError {
                status_code: status,
                message,
            });
        }

        response.json().await.map_err(|e| BillingError::ApiError {
            status_code: 200,
            message: format!("Failed to parse session response: {e}"),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_session_response() {
        let data = r#"{"id": "cs_test_1", "url": "https://checkout.example/cs_test_1", "mode": "subscription"}"#;
        let session: SessionResponse = serde_json::from_str(data).unwrap();
        assert_eq!(session.url, "https://checkout.example/cs_test_1");
    }

    #[test]
    fn trailing_slash_trimmed_from_base_url() {
        let client = BillingClient::new("sk_test", "https://api.stripe.com/v1/");
        assert_eq!(client.base_url, "https://api.stripe.com/v1");
    }

    #[test]
    fn checkout_params_carry_optional_customer() {
        let params = CheckoutParams {
            price_id: "price_pro".into(),
            success_url: "https://gaian.example/account?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "https://gaian.example/pricing".into(),
            customer_id: None,
        };
        assert!(params.customer_id.is_none());
        assert!(params.success_url.contains("{CHECKOUT_SESSION_ID}"));
    }
}
