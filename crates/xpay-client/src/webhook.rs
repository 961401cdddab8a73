//! # XPay Webhook Handling
//!
//! Signature verification, payload parsing and dispatch for XPay webhooks.
//!
//! The signature header carries the hex HMAC-SHA256 of the raw request body,
//! keyed with the webhook signing secret, optionally prefixed with `sha256=`.

use chrono::DateTime;
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use tracing::{debug, info, warn};
use xpay_core::{
    PaymentError, PaymentResult, PaymentStatus, WebhookEvent, WebhookEventType,
};

type HmacSha256 = Hmac<Sha256>;

/// Header XPay puts the signature in
pub const SIGNATURE_HEADER: &str = "x-xpay-signature";

/// Events that should be enabled in the XPay dashboard
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "payment.completed",
    "payment.failed",
    "payment.cancelled",
];

/// Hex HMAC-SHA256 of `payload` keyed with `secret`
pub fn compute_signature(secret: &str, payload: &[u8]) -> PaymentResult<String> {
    let mut mac = new_mac(secret)?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check `signature` against the payload in constant time.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> PaymentResult<()> {
    let signature = signature.trim();
    let signature = signature.strip_prefix("sha256=").unwrap_or(signature);

    if signature.is_empty() {
        return Err(PaymentError::SignatureVerification(
            "Missing signature".to_string(),
        ));
    }

    let expected = hex::decode(signature).map_err(|_| {
        PaymentError::SignatureVerification("Signature is not hex encoded".to_string())
    })?;

    let mut mac = new_mac(secret)?;
    mac.update(payload);
    mac.verify_slice(&expected)
        .map_err(|_| PaymentError::SignatureVerification("Signature mismatch".to_string()))
}

fn new_mac(secret: &str) -> PaymentResult<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::WebhookConfig(format!("Unusable webhook secret: {}", e)))
}

/// Parse an already authenticated webhook body.
///
/// The body must be a JSON object with a string `type`. Payment fields are
/// read from `data` when present, otherwise from the top level.
pub fn parse_event(payload: &[u8]) -> PaymentResult<WebhookEvent> {
    let raw: Value = serde_json::from_slice(payload)
        .map_err(|e| PaymentError::WebhookPayload(format!("Body is not JSON: {}", e)))?;

    let obj = raw
        .as_object()
        .ok_or_else(|| PaymentError::WebhookPayload("Body is not a JSON object".to_string()))?;

    let type_str = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| PaymentError::WebhookPayload("Missing event type".to_string()))?;
    let event_type = WebhookEventType::parse(type_str);

    let data: &Map<String, Value> = obj
        .get("data")
        .and_then(Value::as_object)
        .unwrap_or(obj);

    let payment_id = data
        .get("payment_id")
        .and_then(Value::as_str)
        .map(String::from);

    let status = data
        .get("status")
        .and_then(|v| serde_json::from_value::<PaymentStatus>(v.clone()).ok())
        .or_else(|| event_type.status());

    let amount = data.get("amount").and_then(Value::as_i64);

    let metadata = data
        .get("metadata")
        .and_then(Value::as_object)
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    let created_at = obj
        .get("created")
        .and_then(Value::as_i64)
        .and_then(|ts| DateTime::from_timestamp(ts, 0));

    let event_id = obj.get("id").and_then(Value::as_str).map(String::from);

    debug!("Parsed XPay webhook: type={}, payment={:?}", type_str, payment_id);

    Ok(WebhookEvent {
        event_id,
        event_type,
        payment_id,
        status,
        amount,
        metadata,
        created_at,
        raw_data: raw,
    })
}

/// Webhook event handler trait
///
/// Implement this trait to react to payment lifecycle changes.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Payment finished successfully; fulfil the order here
    fn on_payment_completed(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(
            "Payment completed: payment={:?}, amount={:?}",
            event.payment_id, event.amount
        );
        Ok(())
    }

    fn on_payment_failed(&self, event: &WebhookEvent) -> PaymentResult<()> {
        warn!("Payment failed: {:?}", event.payment_id);
        Ok(())
    }

    fn on_payment_cancelled(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!("Payment cancelled: {:?}", event.payment_id);
        Ok(())
    }

    fn on_payment_pending(&self, event: &WebhookEvent) -> PaymentResult<()> {
        debug!("Payment pending: {:?}", event.payment_id);
        Ok(())
    }

    /// Called for unknown/unhandled events
    fn on_unknown_event(&self, event: &WebhookEvent) -> PaymentResult<()> {
        debug!("Unhandled webhook event: {:?}", event.event_type);
        Ok(())
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(handler: &dyn WebhookHandler, event: &WebhookEvent) -> PaymentResult<()> {
    match &event.event_type {
        WebhookEventType::PaymentCompleted => handler.on_payment_completed(event),
        WebhookEventType::PaymentFailed => handler.on_payment_failed(event),
        WebhookEventType::PaymentCancelled => handler.on_payment_cancelled(event),
        WebhookEventType::PaymentPending => handler.on_payment_pending(event),
        WebhookEventType::Unknown(_) => handler.on_unknown_event(event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"payment.completed","created":1700000000,"data":{"payment_id":"pay_1","status":"completed","amount":4500,"metadata":{"source":"faq-ai-toolkit"}}}"#;

    #[test]
    fn test_signature_round_trip() {
        let sig = compute_signature(SECRET, BODY).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(verify_signature(SECRET, BODY, &sig).is_ok());
        assert!(verify_signature(SECRET, BODY, &format!("sha256={}", sig.to_uppercase())).is_ok());
    }

    #[test]
    fn test_signature_rejections() {
        let sig = compute_signature(SECRET, BODY).unwrap();

        let tampered = br#"{"id":"evt_1","type":"payment.completed","data":{"payment_id":"pay_2"}}"#;
        assert!(matches!(
            verify_signature(SECRET, tampered, &sig),
            Err(PaymentError::SignatureVerification(_))
        ));
        assert!(matches!(
            verify_signature("whsec_other", BODY, &sig),
            Err(PaymentError::SignatureVerification(_))
        ));
        assert!(matches!(
            verify_signature(SECRET, BODY, ""),
            Err(PaymentError::SignatureVerification(_))
        ));
        assert!(matches!(
            verify_signature(SECRET, BODY, "not-hex"),
            Err(PaymentError::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_parse_event() {
        let event = parse_event(BODY).unwrap();

        assert_eq!(event.event_id.as_deref(), Some("evt_1"));
        assert_eq!(event.event_type, WebhookEventType::PaymentCompleted);
        assert_eq!(event.payment_id.as_deref(), Some("pay_1"));
        assert_eq!(event.status, Some(PaymentStatus::Completed));
        assert_eq!(event.amount, Some(4500));
        assert_eq!(event.metadata.get("source").map(String::as_str), Some("faq-ai-toolkit"));
        assert_eq!(event.created_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_flat_event_takes_status_from_type() {
        let event = parse_event(br#"{"type":"payment.failed","payment_id":"pay_9"}"#).unwrap();
        assert_eq!(event.payment_id.as_deref(), Some("pay_9"));
        assert_eq!(event.status, Some(PaymentStatus::Failed));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let bodies: [&[u8]; 4] = [b"not json", b"[1,2,3]", br#"{"data":{}}"#, br#"{"type":7}"#];
        for body in bodies {
            assert!(matches!(parse_event(body), Err(PaymentError::WebhookPayload(_))));
        }
    }

    #[test]
    fn test_dispatch_webhook() {
        #[derive(Default)]
        struct CountingHandler {
            completed: AtomicUsize,
            unknown: AtomicUsize,
        }

        impl WebhookHandler for CountingHandler {
            fn on_payment_completed(&self, _event: &WebhookEvent) -> PaymentResult<()> {
                self.completed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }

            fn on_unknown_event(&self, _event: &WebhookEvent) -> PaymentResult<()> {
                self.unknown.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let handler = CountingHandler::default();
        dispatch_webhook_event(&handler, &parse_event(BODY).unwrap()).unwrap();
        dispatch_webhook_event(&handler, &parse_event(br#"{"type":"refund.issued"}"#).unwrap())
            .unwrap();

        assert_eq!(handler.completed.load(Ordering::SeqCst), 1);
        assert_eq!(handler.unknown.load(Ordering::SeqCst), 1);
    }
}
