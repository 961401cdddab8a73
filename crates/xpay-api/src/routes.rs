//! # Routes
//!
//! Axum router configuration for the checkout server.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Browser API:
///   - POST /api/xpay/create-payment - Create payment, returns checkout URL
///   - GET  /api/xpay/payments/{payment_id} - Payment status
///   - GET  /api/products - Active products
///
/// - Webhooks:
///   - POST /api/xpay/webhook - XPay webhook handler
///
/// - Static pages:
///   - GET /success - Success page
///   - GET /cancel - Cancel page
pub fn create_router(state: AppState) -> Router {
    // The landing page is served from BASE_URL; only that origin may call us
    let cors = match HeaderValue::from_str(&state.urls.base_url) {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::POST])
    .allow_headers(Any);

    let xpay_routes = Router::new()
        .route("/create-payment", post(handlers::create_payment))
        .route("/payments/{payment_id}", get(handlers::payment_status))
        // Webhook must see the raw body
        .route("/webhook", post(handlers::xpay_webhook));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Provider redirect targets
        .route("/success", get(handlers::checkout_success))
        .route("/cancel", get(handlers::checkout_cancel))
        .route("/api/products", get(handlers::list_products))
        .nest("/api/xpay", xpay_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
