use std::time::Duration;

use crate::domain::notification::DEFAULT_EXPIRY;

// ============================================================================
// Client Configuration
// ============================================================================

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_ORDER_PATH: &str = "/api/order";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("API base URL must start with http:// or https://: {0}")]
    UnsupportedScheme(String),

    #[error("Order path must start with '/': {0}")]
    InvalidOrderPath(String),

    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and port of the order backend
    pub api_base_url: String,
    pub order_path: String,
    pub request_timeout: Duration,
    /// How long notifications stay visible; zero keeps them until dismissed
    pub notification_expiry: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            order_path: DEFAULT_ORDER_PATH.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            notification_expiry: DEFAULT_EXPIRY,
        }
    }
}

impl ClientConfig {
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_order_path(mut self, path: impl Into<String>) -> Self {
        self.order_path = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_notification_expiry(mut self, expiry: Duration) -> Self {
        self.notification_expiry = expiry;
        self
    }

    pub fn order_url(&self) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), self.order_path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(base.to_string()));
        }
        if !self.order_path.starts_with('/') {
            return Err(ConfigError::InvalidOrderPath(self.order_path.clone()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
