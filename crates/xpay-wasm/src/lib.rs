//! # xpay-wasm
//!
//! WebAssembly buy button for the FAQ AI Toolkit landing page.
//!
//! This crate provides:
//! - `initiate_checkout`: create a payment through the checkout server and
//!   send the browser to the hosted checkout page
//! - Price formatting and validation for the page
//! - gtag analytics helpers
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { initiate_checkout } from 'xpay-wasm';
//!
//! await init();
//!
//! button.disabled = true;
//! await initiate_checkout(45, 'FAQ AI Toolkit', 'faq-toolkit-v1', (msg) => {
//!   button.disabled = false;
//!   showError(msg);
//! });
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response, Window};
use xpay_core::{
    cents_from_dollars, AnalyticsEvent, CheckoutInitiator, CheckoutTransport, CreatePaymentBody,
    CreatePaymentReply, EventSink, Navigator, PaymentError, PaymentResult, SessionStore,
    CREATE_PAYMENT_PATH,
};

/// Message shown when the checkout server answers with a non-2xx status
const INIT_FAILED: &str = "Payment initialization failed";

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

/// `fetch` against the page's own origin
struct FetchTransport {
    window: Window,
}

#[async_trait(?Send)]
impl CheckoutTransport for FetchTransport {
    async fn create_payment(&self, body: &CreatePaymentBody) -> PaymentResult<CreatePaymentReply> {
        let json = serde_json::to_string(body)
            .map_err(|e| PaymentError::Serialization(e.to_string()))?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_body(&JsValue::from_str(&json));

        let request = Request::new_with_str_and_init(CREATE_PAYMENT_PATH, &init)
            .map_err(|e| PaymentError::Network(js_message(&e)))?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|e| PaymentError::Network(js_message(&e)))?;

        let response: Response = JsFuture::from(self.window.fetch_with_request(&request))
            .await
            .and_then(|value| value.dyn_into::<Response>())
            .map_err(|e| PaymentError::Network(js_message(&e)))?;

        if !response.ok() {
            return Err(PaymentError::PaymentCreation(INIT_FAILED.to_string()));
        }

        let text = response
            .text()
            .map_err(|e| PaymentError::Network(js_message(&e)))?;
        let text = JsFuture::from(text)
            .await
            .map_err(|e| PaymentError::Network(js_message(&e)))?
            .as_string()
            .unwrap_or_default();

        serde_json::from_str(&text).map_err(|e| PaymentError::Serialization(e.to_string()))
    }
}

/// `window.sessionStorage`
struct BrowserSessionStore {
    window: Window,
}

impl BrowserSessionStore {
    fn storage(&self) -> PaymentResult<web_sys::Storage> {
        self.window
            .session_storage()
            .map_err(|e| PaymentError::Storage(js_message(&e)))?
            .ok_or_else(|| PaymentError::Storage("sessionStorage unavailable".to_string()))
    }
}

impl SessionStore for BrowserSessionStore {
    fn set_item(&self, key: &str, value: &str) -> PaymentResult<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| PaymentError::Storage(js_message(&e)))
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.storage().ok()?.get_item(key).ok().flatten()
    }
}

/// `window.location`
struct BrowserNavigator {
    window: Window,
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) -> PaymentResult<()> {
        self.window
            .location()
            .set_href(url)
            .map_err(|e| PaymentError::Navigation(js_message(&e)))
    }
}

/// Forwards events to `window.gtag` when the page loaded it.
///
/// Best-effort: a missing or throwing gtag never affects the checkout.
struct GtagEventSink {
    window: Window,
}

impl EventSink for GtagEventSink {
    fn track(&self, event: &AnalyticsEvent) {
        let gtag = match js_sys::Reflect::get(&self.window, &JsValue::from_str("gtag"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
        {
            Some(f) => f,
            None => {
                web_sys::console::debug_1(&JsValue::from_str(&format!(
                    "gtag missing, dropped event {}",
                    event.action
                )));
                return;
            }
        };

        let params = js_sys::JSON::parse(&event.gtag_params().to_string())
            .unwrap_or(JsValue::UNDEFINED);

        if let Err(e) = gtag.call3(
            &JsValue::NULL,
            &JsValue::from_str("event"),
            &JsValue::from_str(&event.action),
            &params,
        ) {
            web_sys::console::debug_1(&JsValue::from_str(&format!(
                "gtag failed: {}",
                js_message(&e)
            )));
        }
    }
}

fn report(on_error: &Option<js_sys::Function>, message: &str) {
    match on_error {
        Some(callback) => {
            let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(message));
        }
        None => web_sys::console::error_1(&JsValue::from_str(message)),
    }
}

/// Start the checkout for one buy-button click.
///
/// `amount` is in whole dollars, as shown on the button. On success the page
/// navigates away; on failure `on_error` receives a message once.
#[wasm_bindgen]
pub async fn initiate_checkout(
    amount: f64,
    product_name: String,
    product_id: String,
    on_error: Option<js_sys::Function>,
) {
    let Some(window) = web_sys::window() else {
        report(&on_error, "Payment failed: no browser window");
        return;
    };

    let Some(cents) = cents_from_dollars(amount) else {
        report(&on_error, "Payment failed: amount must be a whole number of dollars");
        return;
    };

    let origin = match window.location().origin() {
        Ok(origin) => origin,
        Err(e) => {
            report(&on_error, &format!("Payment failed: {}", js_message(&e)));
            return;
        }
    };

    let transport = FetchTransport { window: window.clone() };
    let store = BrowserSessionStore { window: window.clone() };
    let navigator = BrowserNavigator { window: window.clone() };
    let events = GtagEventSink { window };

    CheckoutInitiator::new(&origin, &transport, &store, &navigator, &events)
        .initiate(cents, &product_name, &product_id, |msg| report(&on_error, &msg))
        .await;
}

/// Format a price in cents to display string
#[wasm_bindgen]
pub fn format_price(cents: i64) -> String {
    xpay_core::format_price(cents)
}

/// Whether a whole-dollar button amount can be charged
#[wasm_bindgen]
pub fn is_valid_amount(amount: f64) -> bool {
    cents_from_dollars(amount).is_some_and(xpay_core::is_valid_amount)
}

/// Report a completed purchase from the success page
#[wasm_bindgen]
pub fn track_payment_completed(transaction_id: &str, amount_cents: i64) {
    track(AnalyticsEvent::payment_completed(transaction_id, amount_cents));
}

/// Report a click on a landing page button
#[wasm_bindgen]
pub fn track_button_click(button: &str, section: &str) {
    track(AnalyticsEvent::button_click(button, section));
}

/// Report a landing page section scrolled into view
#[wasm_bindgen]
pub fn track_section_view(section: &str) {
    track(AnalyticsEvent::section_view(section));
}

#[wasm_bindgen]
pub fn track_video_play(video: &str) {
    track(AnalyticsEvent::video_play(video));
}

/// Report a click on a free download (sample pack, guide)
#[wasm_bindgen]
pub fn track_download_attempt(kind: &str) {
    track(AnalyticsEvent::download_attempt(kind));
}

fn track(event: AnalyticsEvent) {
    if let Some(window) = web_sys::window() {
        GtagEventSink { window }.track(&event);
    }
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(4500), "$45.00");
        assert_eq!(format_price(1999), "$19.99");
    }

    #[test]
    fn test_is_valid_amount_takes_dollars() {
        assert!(is_valid_amount(45.0));
        assert!(is_valid_amount(9999.0));
        assert!(!is_valid_amount(10000.0));
        assert!(!is_valid_amount(0.0));
        assert!(!is_valid_amount(-5.0));
        assert!(!is_valid_amount(45.5));
        assert!(!is_valid_amount(f64::NAN));
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
