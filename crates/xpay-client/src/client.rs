//! # XPay Payments API
//!
//! Typed wrapper around the XPay REST API: create a hosted-checkout payment,
//! look up its status, and authenticate webhooks.

use crate::config::{ProviderConfig, USER_AGENT};
use crate::webhook::{parse_event, verify_signature};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};
use xpay_core::{
    PaymentError, PaymentProvider, PaymentRequest, PaymentResponse, PaymentResult, WebhookEvent,
    CURRENCY,
};

/// Tag merged into every payment's metadata
pub const SOURCE_TAG: &str = "faq-ai-toolkit";

/// XPay hosted-checkout client
///
/// Built once at startup and shared; holds no mutable state.
pub struct XPayClient {
    config: ProviderConfig,
    client: Client,
}

impl XPayClient {
    /// Create a new client
    pub fn new(config: ProviderConfig) -> PaymentResult<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PaymentError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(ProviderConfig::from_env()?)
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Collection endpoint, e.g. `https://api.xpay.com/v1/payments`
    pub fn payments_url(&self) -> String {
        format!("{}/v1/payments", self.config.base_url())
    }

    /// Endpoint for one payment, with the id encoded as a single path segment
    pub fn payment_url(&self, payment_id: &str) -> PaymentResult<Url> {
        let mut url = Url::parse(&self.payments_url())
            .map_err(|e| PaymentError::Configuration(format!("Invalid API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PaymentError::Configuration("API base URL cannot have a path".to_string()))?
            .push(payment_id);
        Ok(url)
    }

    /// Provider request body for a validated request
    fn build_body(request: &PaymentRequest) -> XPayPaymentBody<'_> {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::from(SOURCE_TAG));
        for (key, value) in &request.metadata {
            metadata.insert(key.clone(), value.clone());
        }

        XPayPaymentBody {
            amount: request.amount,
            currency: CURRENCY,
            product_name: &request.product_name,
            product_id: &request.product_id,
            success_url: &request.success_url,
            cancel_url: &request.cancel_url,
            customer_email: request.customer_email.as_deref(),
            metadata,
        }
    }

    /// Send a request and hand back status plus body text
    async fn send(&self, request: reqwest::RequestBuilder) -> PaymentResult<(reqwest::StatusCode, String)> {
        let response = request
            .header("Authorization", self.config.auth_header())
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        Ok((status, body))
    }
}

fn parse_payment(body: &str) -> PaymentResult<PaymentResponse> {
    serde_json::from_str(body).map_err(|e| {
        PaymentError::Serialization(format!("Failed to parse XPay response: {}", e))
    })
}

/// Error `message` from a provider error body, if it has one
fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<XPayErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
}

#[async_trait]
impl PaymentProvider for XPayClient {
    #[instrument(skip(self, request), fields(product_id = %request.product_id, amount = request.amount))]
    async fn create_payment(&self, request: &PaymentRequest) -> PaymentResult<PaymentResponse> {
        request.validate()?;

        let url = self.payments_url();
        debug!("Creating XPay payment at {}", url);

        let (status, body) = self
            .send(self.client.post(&url).json(&Self::build_body(request)))
            .await?;

        if !status.is_success() {
            error!("XPay API error: status={}, body={}", status, body);
            return Err(PaymentError::PaymentCreation(
                provider_message(&body).unwrap_or_else(|| "Payment creation failed".to_string()),
            ));
        }

        let payment = parse_payment(&body)?;

        info!(
            "Created XPay payment: id={}, url={}",
            payment.payment_id, payment.checkout_url
        );

        Ok(payment)
    }

    #[instrument(skip(self))]
    async fn verify_payment(&self, payment_id: &str) -> PaymentResult<PaymentResponse> {
        if payment_id.trim().is_empty() {
            return Err(PaymentError::Validation("payment id is empty".to_string()));
        }

        let url = self.payment_url(payment_id)?;
        let (status, body) = self.send(self.client.get(url)).await?;

        if !status.is_success() {
            error!("XPay API error: status={}, body={}", status, body);
            return Err(PaymentError::PaymentVerification(
                provider_message(&body).unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }

        let payment = parse_payment(&body)?;
        debug!("XPay payment {} is {}", payment.payment_id, payment.status);

        Ok(payment)
    }

    #[instrument(skip(self, payload, signature), fields(bytes = payload.len()))]
    async fn handle_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<WebhookEvent> {
        let secret = self.config.webhook_secret.as_deref().ok_or_else(|| {
            PaymentError::WebhookConfig("Webhook secret not configured".to_string())
        })?;

        verify_signature(secret, payload, signature)?;
        let event = parse_event(payload)?;

        info!(
            "Verified XPay webhook: type={:?}, id={:?}",
            event.event_type, event.event_id
        );

        Ok(event)
    }

    fn provider_name(&self) -> &'static str {
        "xpay"
    }
}

// =============================================================================
// XPay API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct XPayPaymentBody<'a> {
    amount: i64,
    currency: &'static str,
    product_name: &'a str,
    product_id: &'a str,
    success_url: &'a str,
    cancel_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_email: Option<&'a str>,
    metadata: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct XPayErrorResponse {
    #[serde(default)]
    message: Option<String>,
}
