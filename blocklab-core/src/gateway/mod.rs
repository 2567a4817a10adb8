//! Persistence gateway trait and structured error types.
//!
//! The save gate talks to storage only through `PersistenceGateway`, so the
//! HTTP API, a local directory, or a test double can stand behind it.

pub mod file;
pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::StrategyDocument;

pub use file::JsonFileGateway;
pub use http::HttpGateway;

/// Why a gateway could not persist a strategy.
///
/// Every variant is recoverable: the editor reports it and stays editable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("strategy service unreachable: {0}")]
    Unreachable(String),

    #[error("strategy service rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("could not encode strategy: {0}")]
    Encode(String),
}

/// What a gateway hands back after persisting a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStrategy {
    /// Where it went (URL or file path).
    pub location: String,
    /// The persisted representation returned by the backend, `Null` if none.
    pub body: serde_json::Value,
}

impl SavedStrategy {
    /// The backend-assigned id, when the response carries one.
    pub fn id(&self) -> Option<String> {
        match self.body.get("id")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Storage backend for validated strategies.
pub trait PersistenceGateway: Send + Sync {
    /// Human-readable name of this gateway.
    fn name(&self) -> &str;

    /// Persist one strategy document.
    fn persist(&self, document: &StrategyDocument) -> Result<SavedStrategy, GatewayError>;
}
