//! # xpay-api
//!
//! Checkout server for the FAQ AI Toolkit landing page.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The same-origin create-payment endpoint the buy button calls
//! - Webhook receiver for XPay payment events
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/xpay/create-payment` | Create payment, returns checkout URL |
//! | GET | `/api/xpay/payments/{payment_id}` | Payment status |
//! | POST | `/api/xpay/webhook` | XPay webhook |
//! | GET | `/api/products` | List products |
//! | GET | `/success`, `/cancel` | Redirect targets |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
