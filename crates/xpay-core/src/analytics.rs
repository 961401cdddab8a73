//! # Analytics Events
//!
//! Landing-page analytics as an injected capability. Sinks are best-effort:
//! tracking never fails the caller.

use crate::price::CURRENCY;
use crate::product::FAQ_TOOLKIT_ID;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A single analytics hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// Event name (e.g. "begin_checkout")
    pub event: String,
    pub category: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl AnalyticsEvent {
    pub fn new(event: impl Into<String>, category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            category: category.into(),
            action: action.into(),
            label: None,
            value: None,
            params: Map::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn button_click(button: &str, section: &str) -> Self {
        Self::new("engagement", "user_interaction", "button_click")
            .with_label(format!("{}_{}", section, button))
    }

    pub fn section_view(section: &str) -> Self {
        Self::new("section_view", "page_interaction", "section_viewed").with_label(section)
    }

    pub fn video_play(video: &str) -> Self {
        Self::new("video_play", "media_interaction", "video_started").with_label(video)
    }

    pub fn download_attempt(kind: &str) -> Self {
        Self::new("download_attempt", "conversion", "download_started").with_label(kind)
    }

    /// Fired once per checkout attempt, just before the create-payment call
    pub fn payment_initiated(amount_cents: i64) -> Self {
        Self::new("begin_checkout", "ecommerce", "payment_initiated")
            .with_value(amount_cents as f64)
            .with_param("currency", CURRENCY)
            .with_param("payment_method", "xpay")
    }

    /// Purchase conversion, reported from the success page
    pub fn payment_completed(transaction_id: &str, amount_cents: i64) -> Self {
        let value = amount_cents as f64;
        Self::new("purchase", "ecommerce", "purchase_completed")
            .with_label("faq_toolkit")
            .with_value(value)
            .with_param("transaction_id", transaction_id)
            .with_param("currency", CURRENCY)
            .with_param(
                "items",
                json!([{
                    "item_id": FAQ_TOOLKIT_ID,
                    "item_name": "FAQ AI Toolkit",
                    "item_category": "software",
                    "price": value,
                    "quantity": 1
                }]),
            )
    }

    /// Flattened parameter object in the shape `gtag('event', action, params)` expects
    pub fn gtag_params(&self) -> Value {
        let mut params = Map::new();
        params.insert("event_category".into(), Value::from(self.category.clone()));
        if let Some(label) = &self.label {
            params.insert("event_label".into(), Value::from(label.clone()));
        }
        if let Some(value) = self.value {
            params.insert("value".into(), Value::from(value));
        }
        for (key, value) in &self.params {
            params.insert(key.clone(), value.clone());
        }
        Value::Object(params)
    }
}

/// Destination for analytics events
pub trait EventSink {
    fn track(&self, event: &AnalyticsEvent);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn track(&self, _event: &AnalyticsEvent) {}
}
