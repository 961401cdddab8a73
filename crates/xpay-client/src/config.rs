//! # XPay Configuration
//!
//! Configuration for the XPay integration.
//! Secrets are loaded from environment variables once at startup and never
//! leave the server.

use std::env;
use std::fmt;
use std::time::Duration;
use xpay_core::PaymentError;

const PRODUCTION_BASE_URL: &str = "https://api.xpay.com";
const SANDBOX_BASE_URL: &str = "https://sandbox.xpay.com";

/// Sent with every provider request
pub const USER_AGENT: &str = "FAQ-AI-Toolkit/1.0";

/// XPay deployment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    /// `"production"` selects production; anything else is sandbox.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Sandbox => SANDBOX_BASE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Sandbox => "sandbox",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Sandbox
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// XPay API configuration
#[derive(Clone)]
pub struct ProviderConfig {
    /// Secret API key, sent as a bearer token
    pub api_key: String,

    pub environment: Environment,

    /// Webhook signing secret; webhooks are refused without one
    pub webhook_secret: Option<String>,

    /// API base URL override (for testing/mocking)
    pub api_base_url: Option<String>,

    /// Request timeout; unset leaves the transport default
    pub timeout: Option<Duration>,
}

impl ProviderConfig {
    /// Create config with explicit values
    pub fn new(api_key: impl Into<String>, environment: Environment) -> Self {
        Self {
            api_key: api_key.into(),
            environment,
            webhook_secret: None,
            api_base_url: None,
            timeout: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `XPAY_API_KEY`
    ///
    /// Optional:
    /// - `XPAY_ENVIRONMENT` (`sandbox` | `production`, default sandbox)
    /// - `XPAY_WEBHOOK_SECRET`
    /// - `XPAY_API_BASE_URL`
    /// - `XPAY_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (environment, test fixtures)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("XPAY_API_KEY")
            .ok_or_else(|| PaymentError::Configuration("XPAY_API_KEY not set".to_string()))?;

        let environment = non_empty("XPAY_ENVIRONMENT")
            .map(|v| Environment::parse(&v))
            .unwrap_or_default();

        let timeout = match non_empty("XPAY_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.trim().parse().map_err(|_| {
                PaymentError::Configuration(format!("XPAY_TIMEOUT_SECS is not a number: {}", raw))
            })?)),
            None => None,
        };

        Ok(Self {
            api_key,
            environment,
            webhook_secret: non_empty("XPAY_WEBHOOK_SECRET"),
            api_base_url: non_empty("XPAY_API_BASE_URL"),
            timeout,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Builder: set webhook signing secret
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"[redacted]")
            .field("environment", &self.environment)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
