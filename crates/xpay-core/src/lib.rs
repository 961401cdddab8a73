//! # xpay-core
//!
//! Core types and flows for the FAQ AI Toolkit XPay checkout.
//!
//! This crate provides:
//! - `PaymentRequest`, `PaymentResponse` and `PaymentStatus` for the provider API
//! - `PaymentProvider` trait implemented by `xpay-client`
//! - `CheckoutInitiator` for the browser-side buy button
//! - `format_price` / `is_valid_amount` price utilities
//! - `EventSink` analytics capability
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use xpay_core::{CheckoutInitiator, NoopEventSink};
//!
//! let initiator = CheckoutInitiator::new(&origin, &transport, &store, &navigator, &NoopEventSink);
//! initiator
//!     .initiate(4500, "FAQ AI Toolkit", "faq-toolkit-v1", |msg| show_error(&msg))
//!     .await;
//! ```

pub mod analytics;
pub mod checkout;
pub mod error;
pub mod payment;
pub mod price;
pub mod product;
pub mod provider;

// Re-exports for convenience
pub use analytics::{AnalyticsEvent, EventSink, NoopEventSink};
pub use checkout::{
    CheckoutInitiator, CheckoutTransport, Navigator, SessionStore, CREATE_PAYMENT_PATH,
    PAYMENT_ID_STORAGE_KEY,
};
pub use error::{PaymentError, PaymentResult};
pub use payment::{
    CreatePaymentBody, CreatePaymentReply, PaymentRequest, PaymentResponse, PaymentStatus,
    WebhookEvent, WebhookEventType,
};
pub use price::{cents_from_dollars, format_price, is_valid_amount, CURRENCY, MAX_AMOUNT};
pub use product::{Product, ProductCatalog, FAQ_TOOLKIT_ID};
pub use provider::{CheckoutUrls, PaymentProvider, SharedPaymentProvider};
