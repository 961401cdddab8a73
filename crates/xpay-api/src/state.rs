//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the payment provider, product catalog and configuration; all of it
//! is built once in `main` and never mutated afterwards.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use xpay_client::XPayClient;
use xpay_core::{CheckoutUrls, ProductCatalog, SharedPaymentProvider};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public origin of the landing page, used for redirect URLs
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, falling back to local defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
            base_url: lookup("BASE_URL").unwrap_or_else(|| "http://localhost:8080".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment provider (XPay in production, fakes in tests)
    pub provider: SharedPaymentProvider,
    /// Product catalog
    pub catalog: Arc<ProductCatalog>,
    /// Redirect targets handed to the provider
    pub urls: CheckoutUrls,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Build state from the environment with the XPay client
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let catalog = load_product_catalog()?;

        let client = XPayClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize XPay: {}", e))?;
        tracing::info!("XPay environment: {}", client.config().environment);

        Ok(Self::with_provider(config, Arc::new(client), catalog))
    }

    /// Assemble state from explicit parts
    pub fn with_provider(
        config: AppConfig,
        provider: SharedPaymentProvider,
        catalog: ProductCatalog,
    ) -> Self {
        Self {
            provider,
            catalog: Arc::new(catalog),
            urls: CheckoutUrls::new(&config.base_url),
            config,
        }
    }

    /// Use the browser-supplied redirect if it points back at our origin,
    /// otherwise the configured one.
    pub fn redirect_or_default(&self, requested: &str, default: String) -> String {
        let origin = format!("{}/", self.urls.base_url);
        if requested.starts_with(&origin) {
            requested.to_string()
        } else {
            if !requested.is_empty() {
                tracing::warn!("Ignoring foreign redirect URL: {}", requested);
            }
            default
        }
    }
}

/// Load product catalog from config file
fn load_product_catalog() -> anyhow::Result<ProductCatalog> {
    let config_paths = [
        "config/products.toml",
        "../config/products.toml",
        "../../config/products.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = ProductCatalog::from_toml(&content)
                .with_context(|| format!("Failed to parse {}", path))?;
            tracing::info!("Loaded {} products from {}", catalog.products.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No product catalog found, using built-in catalog");
    Ok(ProductCatalog::builtin())
}
