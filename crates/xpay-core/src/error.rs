//! # Payment Error Types
//!
//! Typed error handling for the XPay checkout.
//! All payment operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Request rejected before dispatch (amount out of range, empty fields)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport-level failure talking to the provider or the checkout endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Provider refused to create the payment
    #[error("Payment creation failed: {0}")]
    PaymentCreation(String),

    /// Provider refused to report payment status
    #[error("Payment verification failed: {0}")]
    PaymentVerification(String),

    /// Webhook received but no signing secret is configured
    #[error("Webhook configuration error: {0}")]
    WebhookConfig(String),

    /// Webhook body is not a well-formed event
    #[error("Invalid webhook payload: {0}")]
    WebhookPayload(String),

    /// Webhook signature missing or does not match the payload
    #[error("Webhook signature verification failed: {0}")]
    SignatureVerification(String),

    /// Configuration errors (missing keys, invalid environment)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Session storage rejected the correlation id
    #[error("Storage error: {0}")]
    Storage(String),

    /// Browser refused the redirect
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Validation(_) => 400,
            PaymentError::Network(_) => 503,
            PaymentError::PaymentCreation(_) => 502,
            PaymentError::PaymentVerification(_) => 502,
            PaymentError::WebhookConfig(_) => 500,
            PaymentError::WebhookPayload(_) => 400,
            PaymentError::SignatureVerification(_) => 401,
            PaymentError::Configuration(_) => 500,
            PaymentError::ProductNotFound { .. } => 404,
            PaymentError::Storage(_) => 500,
            PaymentError::Navigation(_) => 500,
            PaymentError::Serialization(_) => 502,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PaymentError::Validation("amount".into()).status_code(), 400);
        assert_eq!(
            PaymentError::ProductNotFound {
                product_id: "x".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            PaymentError::SignatureVerification("mismatch".into()).status_code(),
            401
        );
        assert_eq!(PaymentError::PaymentCreation("declined".into()).status_code(), 502);
    }

    #[test]
    fn test_messages_carry_provider_text() {
        let err = PaymentError::PaymentCreation("card_declined".into());
        assert_eq!(err.to_string(), "Payment creation failed: card_declined");
    }
}
