use serde::Serialize;

// ============================================================================
// Order Errors
// ============================================================================

pub const INVALID_CUSTOMER_NAME: &str =
    "Customer name can only contain letters, digits, or hyphens";

pub const GENERIC_ORDER_FAILURE: &str = "An error occurred while placing order";

/// Field-level rule violation. Shown inline, never sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{message}")]
    InvalidFormat { value: String, message: &'static str },
}

/// Failure reported by an [`OrderGateway`](crate::gateway::OrderGateway).
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// No response was received (connection refused, timeout, ...)
    #[error("Error: {0}")]
    Transport(String),

    /// Backend rejected the order (HTTP 400); text is the response body
    #[error("{0}")]
    ServerValidation(String),

    /// Backend failed (HTTP 5xx or an unexpected body)
    #[error("{0}")]
    ServerFault(String),
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Transport(_) => "transport",
            GatewayError::ServerValidation(_) => "server_validation",
            GatewayError::ServerFault(_) => "server_fault",
        }
    }
}
