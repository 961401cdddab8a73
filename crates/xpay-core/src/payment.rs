//! # Payment Types
//!
//! Request/response shapes shared by the provider client, the checkout
//! server and the browser-side initiator.

use crate::error::{PaymentError, PaymentResult};
use crate::price::{is_valid_amount, MAX_AMOUNT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single checkout attempt sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount in smallest currency unit (cents)
    pub amount: i64,

    /// Display name of the product
    pub product_name: String,

    /// Stable product slug (e.g. "faq-toolkit-v1")
    pub product_id: String,

    /// Where the provider sends the customer after paying
    pub success_url: String,

    /// Where the provider sends the customer after cancelling
    pub cancel_url: String,

    /// Customer email (optional, for prefill)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    /// Free-form metadata forwarded to the provider
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl PaymentRequest {
    pub fn new(
        amount: i64,
        product_name: impl Into<String>,
        product_id: impl Into<String>,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            product_name: product_name.into(),
            product_id: product_id.into(),
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
            customer_email: None,
            metadata: HashMap::new(),
        }
    }

    /// Set customer email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check every field the provider relies on. Runs before any dispatch.
    pub fn validate(&self) -> PaymentResult<()> {
        if !is_valid_amount(self.amount) {
            return Err(PaymentError::Validation(format!(
                "amount must be between 1 and {} cents, got {}",
                MAX_AMOUNT, self.amount
            )));
        }
        if self.product_name.trim().is_empty() {
            return Err(PaymentError::Validation("product name is empty".to_string()));
        }
        if self.product_id.trim().is_empty() {
            return Err(PaymentError::Validation("product id is empty".to_string()));
        }
        for (field, url) in [("success_url", &self.success_url), ("cancel_url", &self.cancel_url)] {
            if !is_absolute_url(url) {
                return Err(PaymentError::Validation(format!(
                    "{} must be an absolute http(s) URL, got {:?}",
                    field, url
                )));
            }
        }
        Ok(())
    }
}

/// Minimal absolute-URL check: scheme plus a non-empty host.
pub fn is_absolute_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !host.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Payment lifecycle as reported by the provider
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// Whether the provider may report `next` after `self`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        *self == next || (*self == PaymentStatus::Pending && next.is_terminal())
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider answer to create/verify calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// Provider-assigned payment id (the correlation identifier)
    pub payment_id: String,

    /// Hosted payment page
    pub checkout_url: String,

    #[serde(default)]
    pub status: PaymentStatus,
}

/// Body the browser posts to `/api/xpay/create-payment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePaymentBody {
    pub amount: i64,
    pub product_name: String,
    pub product_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// What `/api/xpay/create-payment` sends back to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePaymentReply {
    pub checkout_url: String,
    pub payment_id: String,
}

impl From<PaymentResponse> for CreatePaymentReply {
    fn from(response: PaymentResponse) -> Self {
        Self {
            checkout_url: response.checkout_url,
            payment_id: response.payment_id,
        }
    }
}

/// Webhook event types the provider sends.
///
/// Serialized in the provider's dotted form (`payment.completed`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WebhookEventType {
    PaymentPending,
    PaymentCompleted,
    PaymentFailed,
    PaymentCancelled,
    /// Unknown event (passthrough)
    Unknown(String),
}

impl WebhookEventType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "payment.pending" | "payment.created" => WebhookEventType::PaymentPending,
            "payment.completed" => WebhookEventType::PaymentCompleted,
            "payment.failed" => WebhookEventType::PaymentFailed,
            "payment.cancelled" => WebhookEventType::PaymentCancelled,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    /// Wire name, the inverse of [`parse`](Self::parse)
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::PaymentPending => "payment.pending",
            WebhookEventType::PaymentCompleted => "payment.completed",
            WebhookEventType::PaymentFailed => "payment.failed",
            WebhookEventType::PaymentCancelled => "payment.cancelled",
            WebhookEventType::Unknown(raw) => raw,
        }
    }

    /// Status implied by the event, if any
    pub fn status(&self) -> Option<PaymentStatus> {
        match self {
            WebhookEventType::PaymentPending => Some(PaymentStatus::Pending),
            WebhookEventType::PaymentCompleted => Some(PaymentStatus::Completed),
            WebhookEventType::PaymentFailed => Some(PaymentStatus::Failed),
            WebhookEventType::PaymentCancelled => Some(PaymentStatus::Cancelled),
            WebhookEventType::Unknown(_) => None,
        }
    }
}

impl From<String> for WebhookEventType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<WebhookEventType> for String {
    fn from(event_type: WebhookEventType) -> Self {
        event_type.as_str().to_string()
    }
}

/// A verified and parsed webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    pub event_type: WebhookEventType,

    /// Related payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,

    /// Amount (in smallest unit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,

    /// Provider timestamp, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Raw event body (for debugging)
    pub raw_data: serde_json::Value,
}
