//! # Checkout Initiator
//!
//! Turns one buy-button click into exactly one create-payment call and one
//! navigation. Browser capabilities are injected so the flow runs the same
//! under wasm and in native tests.
//!
//! Single-flight per call: the caller disables the trigger while the future
//! is pending. There is no retry and no local timeout.

use crate::analytics::{AnalyticsEvent, EventSink};
use crate::error::{PaymentError, PaymentResult};
use crate::payment::{is_absolute_url, CreatePaymentBody, CreatePaymentReply};
use crate::price::{is_valid_amount, MAX_AMOUNT};
use crate::provider::CheckoutUrls;
use async_trait::async_trait;

/// Session storage key holding the last initiated payment id
pub const PAYMENT_ID_STORAGE_KEY: &str = "xpay_payment_id";

/// Same-origin endpoint that creates the payment server-side
pub const CREATE_PAYMENT_PATH: &str = "/api/xpay/create-payment";

/// Posts a [`CreatePaymentBody`] to the checkout server.
///
/// Non-2xx answers map to `PaymentCreation`, transport failures to
/// `Network`, undecodable bodies to `Serialization`.
#[async_trait(?Send)]
pub trait CheckoutTransport {
    async fn create_payment(&self, body: &CreatePaymentBody) -> PaymentResult<CreatePaymentReply>;
}

/// Session-scoped key/value store
pub trait SessionStore {
    fn set_item(&self, key: &str, value: &str) -> PaymentResult<()>;
    fn get_item(&self, key: &str) -> Option<String>;
}

/// Full-page navigation
pub trait Navigator {
    fn navigate(&self, url: &str) -> PaymentResult<()>;
}

/// Browser-side checkout flow
pub struct CheckoutInitiator<'a> {
    transport: &'a dyn CheckoutTransport,
    store: &'a dyn SessionStore,
    navigator: &'a dyn Navigator,
    events: &'a dyn EventSink,
    urls: CheckoutUrls,
}

impl<'a> CheckoutInitiator<'a> {
    /// `origin` is the page origin the provider redirects back to.
    pub fn new(
        origin: &str,
        transport: &'a dyn CheckoutTransport,
        store: &'a dyn SessionStore,
        navigator: &'a dyn Navigator,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            transport,
            store,
            navigator,
            events,
            urls: CheckoutUrls::new(origin),
        }
    }

    /// Run the checkout and report any failure through `on_error`.
    ///
    /// `on_error` is called at most once, with a non-empty message. On
    /// success the browser has been sent to the hosted checkout page.
    pub async fn initiate<F>(&self, amount: i64, product_name: &str, product_id: &str, on_error: F)
    where
        F: FnOnce(String),
    {
        if let Err(err) = self.try_initiate(amount, product_name, product_id).await {
            on_error(user_message(&err));
        }
    }

    /// Same as [`initiate`](Self::initiate) but hands the error back.
    /// Returns the stored payment id on success.
    pub async fn try_initiate(
        &self,
        amount: i64,
        product_name: &str,
        product_id: &str,
    ) -> PaymentResult<String> {
        if !is_valid_amount(amount) {
            return Err(PaymentError::Validation(format!(
                "amount must be between 1 and {} cents",
                MAX_AMOUNT
            )));
        }
        if product_name.trim().is_empty() || product_id.trim().is_empty() {
            return Err(PaymentError::Validation(
                "product name and id are required".to_string(),
            ));
        }

        let body = CreatePaymentBody {
            amount,
            product_name: product_name.to_string(),
            product_id: product_id.to_string(),
            success_url: self.urls.success_url(),
            cancel_url: self.urls.cancel_url(),
        };

        self.events.track(&AnalyticsEvent::payment_initiated(amount));

        let reply = self.transport.create_payment(&body).await?;

        if reply.payment_id.is_empty() || !is_absolute_url(&reply.checkout_url) {
            return Err(PaymentError::Serialization(
                "checkout server returned an incomplete payment".to_string(),
            ));
        }

        self.store.set_item(PAYMENT_ID_STORAGE_KEY, &reply.payment_id)?;
        self.navigator.navigate(&reply.checkout_url)?;

        Ok(reply.payment_id)
    }
}

fn user_message(err: &PaymentError) -> String {
    match err {
        PaymentError::PaymentCreation(msg) if !msg.is_empty() => msg.clone(),
        PaymentError::Network(_) => "Payment failed: could not reach the checkout server".to_string(),
        other => other.to_string(),
    }
}
