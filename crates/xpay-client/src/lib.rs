//! # xpay-client
//!
//! XPay payment provider client for the FAQ AI Toolkit checkout.
//!
//! `XPayClient` implements [`xpay_core::PaymentProvider`]:
//!
//! - `create_payment` - `POST /v1/payments`, returns the hosted checkout URL
//! - `verify_payment` - `GET /v1/payments/{id}`, returns the current status
//! - `handle_webhook` - HMAC-SHA256 signature check, then event parsing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use xpay_client::XPayClient;
//! use xpay_core::{PaymentProvider, PaymentRequest};
//!
//! // Built once at startup, then passed to whoever needs it
//! let client = XPayClient::from_env()?;
//!
//! let payment = client.create_payment(&PaymentRequest::new(
//!     4500,
//!     "FAQ AI Toolkit",
//!     "faq-toolkit-v1",
//!     "https://faqtoolkit.dev/success",
//!     "https://faqtoolkit.dev/cancel",
//! )).await?;
//!
//! // Redirect the customer to payment.checkout_url
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use xpay_client::{dispatch_webhook_event, LoggingWebhookHandler};
//!
//! let event = client.handle_webhook(&body, signature).await?;
//! dispatch_webhook_event(&LoggingWebhookHandler, &event)?;
//! ```

pub mod client;
pub mod config;
pub mod webhook;

// Re-exports
pub use client::{XPayClient, SOURCE_TAG};
pub use config::{Environment, ProviderConfig};
pub use webhook::{
    compute_signature, dispatch_webhook_event, verify_signature, LoggingWebhookHandler,
    WebhookHandler, REQUIRED_WEBHOOK_EVENTS, SIGNATURE_HEADER,
};
