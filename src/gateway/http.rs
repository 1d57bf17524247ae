use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::domain::order::{GatewayError, OrderDraft, OrderResponse, GENERIC_ORDER_FAILURE};
use super::OrderGateway;

/// Places orders with `POST {base}{path}` and a JSON body.
///
/// - 2xx: body must decode as `{success, msg}`
/// - 400: body text is the validation message
/// - anything else: best text the response carries
/// - no response at all: `GatewayError::Transport`
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    http: reqwest::Client,
    url: String,
}

impl HttpOrderGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            url: config.order_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn place_order(&self, draft: &OrderDraft) -> Result<OrderResponse, GatewayError> {
        let response = self
            .http
            .post(&self.url)
            .json(draft)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %self.url, "Order request failed");
                GatewayError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!(error = %e, status = %status, "Failed to read order response body");
            GatewayError::Transport(e.to_string())
        })?;

        if status.is_success() {
            let parsed: OrderResponse = serde_json::from_str(&body).map_err(|e| {
                tracing::error!(error = %e, status = %status, "Unexpected order response body");
                GatewayError::ServerFault(format!("Http failure during parsing for {}", self.url))
            })?;

            if !parsed.success {
                tracing::warn!(msg = %parsed.msg, "Backend accepted order but reported success=false");
            }
            return Ok(parsed);
        }

        let message = error_text(&self.url, status, &body);
        tracing::warn!(status = %status, error = %message, "Order rejected by backend");

        if status == StatusCode::BAD_REQUEST {
            Err(GatewayError::ServerValidation(message))
        } else {
            Err(GatewayError::ServerFault(message))
        }
    }
}

/// Best human-readable text for an error response.
///
/// Order of preference: plain-text (or JSON string) body, JSON `msg` field,
/// the status line when there is no body, then a generic message.
fn error_text(url: &str, status: StatusCode, body: &str) -> String {
    let body = body.trim_end();
    if body.is_empty() {
        return format!("Http failure response for {}: {}", url, status);
    }

    match serde_json::from_str::<Value>(body) {
        Err(_) => body.to_string(),
        Ok(Value::String(text)) if !text.is_empty() => text,
        Ok(Value::Object(fields)) => fields
            .get("msg")
            .and_then(Value::as_str)
            .filter(|msg| !msg.is_empty())
            .unwrap_or(GENERIC_ORDER_FAILURE)
            .to_string(),
        Ok(_) => GENERIC_ORDER_FAILURE.to_string(),
    }
}
