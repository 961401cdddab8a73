//! # Request Handlers
//!
//! Axum request handlers for the checkout server.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;
use tracing::{error, info, instrument};
use xpay_client::{dispatch_webhook_event, LoggingWebhookHandler, SIGNATURE_HEADER};
use xpay_core::{
    CreatePaymentBody, CreatePaymentReply, PaymentError, PaymentRequest, PaymentResponse, Product,
    PAYMENT_ID_STORAGE_KEY,
};

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "xpay-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a payment for the buy button and hand back the hosted checkout URL
#[instrument(skip(state, payload))]
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentBody>, JsonRejection>,
) -> Result<Json<CreatePaymentReply>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        payment_error_to_response(PaymentError::Validation(rejection.body_text()))
    })?;

    let product = state.catalog.get(&body.product_id).ok_or_else(|| {
        payment_error_to_response(PaymentError::ProductNotFound {
            product_id: body.product_id.clone(),
        })
    })?;

    if !product.active {
        return Err(payment_error_to_response(PaymentError::Validation(format!(
            "Product is not available: {}",
            product.id
        ))));
    }

    if body.amount != product.price {
        return Err(payment_error_to_response(PaymentError::Validation(format!(
            "amount {} does not match the price of {} ({})",
            body.amount,
            product.id,
            product.display_price()
        ))));
    }

    let success_url = state.redirect_or_default(&body.success_url, state.urls.success_url());
    let cancel_url = state.redirect_or_default(&body.cancel_url, state.urls.cancel_url());
    let attempt_id = uuid::Uuid::new_v4().to_string();

    // Catalog name and id, never the browser-supplied ones
    let request = PaymentRequest::new(
        body.amount,
        product.name.clone(),
        product.id.clone(),
        success_url,
        cancel_url,
    )
    .with_metadata("attempt_id", attempt_id.clone());

    info!(
        "Creating payment: attempt={}, product={}, amount={}",
        attempt_id, request.product_id, request.amount
    );

    let payment = state.provider.create_payment(&request).await.map_err(|e| {
        error!("Failed to create payment: {}", e);
        payment_error_to_response(e)
    })?;

    info!("Created payment: {}", payment.payment_id);

    Ok(Json(payment.into()))
}

/// Current status of a payment, for the success page
#[instrument(skip(state))]
pub async fn payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = state
        .provider
        .verify_payment(&payment_id)
        .await
        .map_err(|e| {
            error!("Failed to verify payment {}: {}", payment_id, e);
            payment_error_to_response(e)
        })?;

    Ok(Json(payment))
}

/// Handle XPay webhook
#[instrument(skip(state, headers, body))]
pub async fn xpay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // A missing header still goes through verification so that an
    // unconfigured secret is reported as such.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let event = state
        .provider
        .handle_webhook(&body, signature)
        .await
        .map_err(|e| {
            error!("Webhook rejected: {}", e);
            payment_error_to_response(e)
        })?;

    info!(
        "Received webhook: type={:?}, payment={:?}",
        event.event_type, event.payment_id
    );

    dispatch_webhook_event(&LoggingWebhookHandler, &event).map_err(|e| {
        error!("Webhook handler error: {}", e);
        payment_error_to_response(e)
    })?;

    Ok((StatusCode::OK, Json(serde_json::json!({ "received": true }))))
}

/// Product as listed for the landing page
#[derive(Debug, Serialize)]
pub struct ProductListing<'a> {
    #[serde(flatten)]
    pub product: &'a Product,
    pub display_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,
}

impl<'a> From<&'a Product> for ProductListing<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            product,
            display_price: product.display_price(),
            discount_percent: product.discount_percent(),
        }
    }
}

/// Get products list
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let products: Vec<ProductListing> = state.catalog.active_products().map(Into::into).collect();
    Json(serde_json::json!({
        "products": products,
        "count": products.len()
    }))
}

/// Checkout success page
///
/// Reads the correlation id the buy button stored and asks the status
/// endpoint what the provider thinks happened.
pub async fn checkout_success() -> impl IntoResponse {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Payment Successful</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #0f172a 0%, #1e1b4b 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <h1>Thank you!</h1>
        <p>Payment <code id="payment-id">unknown</code>: <strong id="payment-status">checking...</strong></p>
        <p style="color: #666;">Your download link will arrive by email.</p>
    </div>
    <script>
        const id = sessionStorage.getItem("{key}");
        const statusEl = document.getElementById("payment-status");
        if (id) {{
            document.getElementById("payment-id").textContent = id;
            fetch("/api/xpay/payments/" + encodeURIComponent(id))
                .then(r => r.ok ? r.json() : Promise.reject(r.status))
                .then(p => {{ statusEl.textContent = p.status; }})
                .catch(() => {{ statusEl.textContent = "unavailable"; }});
        }} else {{
            statusEl.textContent = "no payment on record";
        }}
    </script>
</body>
</html>
"#,
        key = PAYMENT_ID_STORAGE_KEY
    ))
}

/// Checkout cancel page
pub async fn checkout_cancel() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Payment Cancelled</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #0f172a 0%, #1e1b4b 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <h1>Payment Cancelled</h1>
        <p style="color: #666;">No charges were made. <a href="/">Back to the toolkit</a></p>
    </div>
</body>
</html>
"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_router;
    use crate::state::AppConfig;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use xpay_client::{compute_signature, Environment, ProviderConfig, XPayClient};
    use xpay_core::{
        PaymentProvider, PaymentResult, PaymentStatus, ProductCatalog, WebhookEvent,
    };

    #[derive(Default)]
    struct FakeProvider {
        created: Mutex<Vec<PaymentRequest>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl PaymentProvider for FakeProvider {
        async fn create_payment(&self, request: &PaymentRequest) -> PaymentResult<PaymentResponse> {
            request.validate()?;
            if let Some(msg) = &self.fail_with {
                return Err(PaymentError::PaymentCreation(msg.clone()));
            }
            self.created.lock().unwrap().push(request.clone());
            Ok(PaymentResponse {
                payment_id: "pay_1".into(),
                checkout_url: "https://sandbox.xpay.com/c/pay_1".into(),
                status: PaymentStatus::Pending,
            })
        }

        async fn verify_payment(&self, payment_id: &str) -> PaymentResult<PaymentResponse> {
            if payment_id != "pay_1" {
                return Err(PaymentError::PaymentVerification("HTTP 404".into()));
            }
            Ok(PaymentResponse {
                payment_id: payment_id.into(),
                checkout_url: "https://sandbox.xpay.com/c/pay_1".into(),
                status: PaymentStatus::Completed,
            })
        }

        async fn handle_webhook(&self, _payload: &[u8], _signature: &str) -> PaymentResult<WebhookEvent> {
            Err(PaymentError::WebhookConfig("not used".into()))
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            base_url: "https://faqtoolkit.dev".into(),
            environment: "test".into(),
        }
    }

    fn state_with(provider: Arc<dyn PaymentProvider>) -> AppState {
        AppState::with_provider(config(), provider, ProductCatalog::builtin())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn buy_button_body(amount: i64, product_id: &str) -> serde_json::Value {
        serde_json::json!({
            "amount": amount,
            "product_name": "FAQ AI Toolkit - Complete Package",
            "product_id": product_id,
            "success_url": "https://faqtoolkit.dev/success",
            "cancel_url": "https://faqtoolkit.dev/cancel"
        })
    }

    #[test]
    fn test_payment_error_conversion() {
        let (status, json) = payment_error_to_response(PaymentError::Validation("bad".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json.code, 400);
    }

    #[tokio::test]
    async fn test_create_payment_returns_checkout_url() {
        let provider = Arc::new(FakeProvider::default());
        let app = create_router(state_with(provider.clone()));

        let response = app
            .oneshot(post_json("/api/xpay/create-payment", buy_button_body(4500, "faq-toolkit-v1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["payment_id"], "pay_1");
        assert_eq!(body["checkout_url"], "https://sandbox.xpay.com/c/pay_1");

        let created = provider.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].success_url, "https://faqtoolkit.dev/success");
        assert!(created[0].metadata.contains_key("attempt_id"));
    }

    #[tokio::test]
    async fn test_foreign_redirects_are_replaced() {
        let provider = Arc::new(FakeProvider::default());
        let app = create_router(state_with(provider.clone()));

        let mut body = buy_button_body(4500, "faq-toolkit-v1");
        body["success_url"] = "https://evil.example/success".into();
        let response = app
            .oneshot(post_json("/api/xpay/create-payment", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            provider.created.lock().unwrap()[0].success_url,
            "https://faqtoolkit.dev/success"
        );
    }

    #[tokio::test]
    async fn test_provider_sees_catalog_name() {
        let provider = Arc::new(FakeProvider::default());
        let app = create_router(state_with(provider.clone()));

        let mut body = buy_button_body(4500, "faq-toolkit-v1");
        body["product_name"] = "Free Lunch".into();
        let response = app
            .oneshot(post_json("/api/xpay/create-payment", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            provider.created.lock().unwrap()[0].product_name,
            "FAQ AI Toolkit - Complete Package"
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_bad_request() {
        let provider = Arc::new(FakeProvider::default());
        let app = create_router(state_with(provider.clone()));

        let response = app
            .oneshot(post_json(
                "/api/xpay/create-payment",
                serde_json::json!({ "amount": "x" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
        let body = json_body(response).await;
        assert_eq!(body["code"], 400);
        assert!(body["error"].as_str().unwrap().starts_with("Validation error"));
        assert!(provider.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_products_listing() {
        let app = create_router(state_with(Arc::new(FakeProvider::default())));

        let response = app
            .oneshot(Request::get("/api/products").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["products"][0]["id"], "faq-toolkit-v1");
        assert_eq!(body["products"][0]["display_price"], "$45.00");
        assert_eq!(body["products"][0]["discount_percent"], 90);
    }

    #[tokio::test]
    async fn test_price_mismatch_and_unknown_product_skip_provider() {
        let provider = Arc::new(FakeProvider::default());
        let app = create_router(state_with(provider.clone()));

        let response = app
            .clone()
            .oneshot(post_json("/api/xpay/create-payment", buy_button_body(45, "faq-toolkit-v1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json("/api/xpay/create-payment", buy_button_body(4500, "nope")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert!(provider.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_bad_gateway() {
        let provider = Arc::new(FakeProvider {
            fail_with: Some("Card declined".into()),
            ..Default::default()
        });
        let app = create_router(state_with(provider));

        let response = app
            .oneshot(post_json("/api/xpay/create-payment", buy_button_body(4500, "faq-toolkit-v1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Card declined"));
    }

    #[tokio::test]
    async fn test_payment_status() {
        let app = create_router(state_with(Arc::new(FakeProvider::default())));

        let response = app
            .clone()
            .oneshot(Request::get("/api/xpay/payments/pay_1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "completed");

        let response = app
            .oneshot(Request::get("/api/xpay/payments/pay_2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_webhook_with_real_client() {
        let client = XPayClient::new(
            ProviderConfig::new("xk_test_abc", Environment::Sandbox).with_webhook_secret("whsec_1"),
        )
        .unwrap();
        let app = create_router(state_with(Arc::new(client)));

        let payload = r#"{"id":"evt_1","type":"payment.completed","data":{"payment_id":"pay_1"}}"#;
        let signature = compute_signature("whsec_1", payload.as_bytes()).unwrap();

        let signed = Request::post("/api/xpay/webhook")
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(payload))
            .unwrap();
        let response = app.clone().oneshot(signed).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let unsigned = Request::post("/api/xpay/webhook").body(Body::from(payload)).unwrap();
        let response = app.oneshot(unsigned).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_webhook_without_secret_is_server_error() {
        let client =
            XPayClient::new(ProviderConfig::new("xk_test_abc", Environment::Sandbox)).unwrap();
        let app = create_router(state_with(Arc::new(client)));

        let response = app
            .oneshot(Request::post("/api/xpay/webhook").body(Body::from("{}")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("Webhook secret not configured"));
    }

    #[tokio::test]
    async fn test_success_page_reads_session_key() {
        let app = create_router(state_with(Arc::new(FakeProvider::default())));

        let response = app
            .oneshot(Request::get("/success").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("sessionStorage.getItem(\"xpay_payment_id\")"));
    }
}
