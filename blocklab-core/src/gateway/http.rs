//! HTTP persistence gateway: `POST {base}/api/strategies`.
//!
//! Any 2xx is a success and the response body is kept as the persisted
//! representation. Non-2xx responses and transport errors are failures; the
//! save gate treats both the same way. Saves are not retried: a POST that timed
//! out may still have been stored.

use std::time::Duration;

use tracing::{debug, warn};

use super::{GatewayError, PersistenceGateway, SavedStrategy};
use crate::config::BuilderConfig;
use crate::document::StrategyDocument;

pub const STRATEGIES_PATH: &str = "/api/strategies";

/// Strategy service client.
pub struct HttpGateway {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("blocklab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Unreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: Self::endpoint(base_url),
        })
    }

    pub fn from_config(config: &BuilderConfig) -> Result<Self, GatewayError> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Build the strategies URL, tolerating a trailing slash on the base.
    pub fn endpoint(base_url: &str) -> String {
        format!("{}{STRATEGIES_PATH}", base_url.trim_end_matches('/'))
    }

    pub fn url(&self) -> &str {
        &self.endpoint
    }

    /// Turn a status code and raw body into the gateway outcome.
    fn interpret(&self, status: reqwest::StatusCode, body: String) -> Result<SavedStrategy, GatewayError> {
        interpret_response(&self.endpoint, status.as_u16(), body)
    }
}

/// Outcome of a strategies POST given its status and raw body.
///
/// An empty 2xx body becomes `Null`; a non-JSON 2xx body is kept as a JSON
/// string rather than turned into a failure.
pub fn interpret_response(
    location: &str,
    status: u16,
    body: String,
) -> Result<SavedStrategy, GatewayError> {
    if !(200..300).contains(&status) {
        return Err(GatewayError::Rejected { status, body });
    }
    let body = if body.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
    };
    Ok(SavedStrategy {
        location: location.to_string(),
        body,
    })
}

impl PersistenceGateway for HttpGateway {
    fn name(&self) -> &str {
        "strategy_api"
    }

    fn persist(&self, document: &StrategyDocument) -> Result<SavedStrategy, GatewayError> {
        debug!(url = %self.endpoint, blocks = document.blocks.len(), "posting strategy");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(document)
            .send()
            .map_err(|e| {
                warn!(url = %self.endpoint, error = %e, "strategy service unreachable");
                GatewayError::Unreachable(e.to_string())
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| GatewayError::Unreachable(format!("failed to read response: {e}")))?;

        let outcome = self.interpret(status, body);
        if let Err(err) = &outcome {
            warn!(url = %self.endpoint, error = %err, "strategy save rejected");
        }
        outcome
    }
}
