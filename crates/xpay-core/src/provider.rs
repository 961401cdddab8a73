//! # Payment Provider Trait
//!
//! The seam between the checkout server and the payment provider.
//! `xpay-client` implements it against the XPay HTTP API; tests swap in
//! fakes.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          PaymentProvider (trait)            │
//! │  ├── create_payment()                       │
//! │  ├── verify_payment()                       │
//! │  ├── handle_webhook()                       │
//! │  └── provider_name()                        │
//! └─────────────────────────────────────────────┘
//!                       ▲
//!               ┌───────┴───────┐
//!               │  XPayClient   │
//!               └───────────────┘
//! ```

use crate::error::PaymentResult;
use crate::payment::{PaymentRequest, PaymentResponse, WebhookEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations exposed by a hosted-checkout payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a pending payment and return the hosted checkout URL.
    ///
    /// Implementations must reject invalid requests before any network I/O.
    async fn create_payment(&self, request: &PaymentRequest) -> PaymentResult<PaymentResponse>;

    /// Fetch the current status of a previously created payment.
    async fn verify_payment(&self, payment_id: &str) -> PaymentResult<PaymentResponse>;

    /// Authenticate an inbound notification and parse it.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes, exactly as received
    /// * `signature` - Signature header from the request
    async fn handle_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<WebhookEvent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Shared, dynamically dispatched provider
pub type SharedPaymentProvider = Arc<dyn PaymentProvider>;

/// Redirect targets handed to the provider
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Origin of the landing page (e.g., "https://faqtoolkit.dev")
    pub base_url: String,
    pub success_path: String,
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            success_path: "/success".to_string(),
            cancel_path: "/cancel".to_string(),
        }
    }

    pub fn success_url(&self) -> String {
        format!("{}{}", self.base_url, self.success_path)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_urls() {
        let urls = CheckoutUrls::new("https://faqtoolkit.dev/");

        assert_eq!(urls.success_url(), "https://faqtoolkit.dev/success");
        assert_eq!(urls.cancel_url(), "https://faqtoolkit.dev/cancel");
    }
}
