use async_trait::async_trait;

use crate::domain::order::{GatewayError, OrderDraft, OrderResponse};

mod http;

pub use http::HttpOrderGateway;

// ============================================================================
// Order Gateway - Boundary to the order backend
// ============================================================================
//
// Implementations own transport concerns and hand the controller either the
// backend response or a `GatewayError` whose text is ready to show the user.
//
// ============================================================================

#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn place_order(&self, draft: &OrderDraft) -> Result<OrderResponse, GatewayError>;
}
