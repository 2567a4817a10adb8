//! Save gate: decides whether a sequence may be submitted, and keeps at
//! most one submission in flight.
//!
//! The gate never touches the sequence. `begin` captures a snapshot, so edits
//! made while a save is pending do not affect what gets stored.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::document::StrategyDocument;
use crate::domain::ValidationFinding;
use crate::fingerprint::SequenceHash;
use crate::gateway::{GatewayError, PersistenceGateway, SavedStrategy};
use crate::sequence::StrategySequence;

/// Reasons a save is refused before any gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("strategy has {} validation finding(s)", .0.len())]
    ValidationFailed(Vec<ValidationFinding>),

    #[error("a save is already in progress")]
    SaveInFlight,

    #[error("strategy name must not be empty")]
    EmptyName,
}

/// A captured snapshot ready to hand to a gateway.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub document: StrategyDocument,
    pub fingerprint: SequenceHash,
}

/// User-facing result of a finished save.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveNotice {
    Saved {
        name: String,
        id: Option<String>,
        location: String,
        fingerprint: SequenceHash,
    },
    Failed {
        name: String,
        message: String,
    },
}

impl SaveNotice {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveNotice::Saved { .. })
    }

    pub fn message(&self) -> String {
        match self {
            SaveNotice::Saved { name, id: Some(id), .. } => format!("Saved '{name}' (id {id})"),
            SaveNotice::Saved { name, id: None, location, .. } => {
                format!("Saved '{name}' to {location}")
            }
            SaveNotice::Failed { name, message } => format!("Failed to save '{name}': {message}"),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingSave {
    name: String,
    fingerprint: SequenceHash,
}

/// Gate state: idle, or one save pending.
#[derive(Debug, Default)]
pub struct SaveGate {
    pending: Option<PendingSave>,
}

impl SaveGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a save trigger should be enabled right now.
    pub fn can_save(&self, sequence: &StrategySequence) -> bool {
        !self.is_pending() && sequence.can_save()
    }

    /// Start a save stamped with the current time.
    pub fn begin(&mut self, name: &str, sequence: &StrategySequence) -> Result<SaveRequest, SaveError> {
        self.begin_at(name, sequence, Utc::now())
    }

    /// Start a save: check the gate, snapshot the sequence, mark pending.
    pub fn begin_at(
        &mut self,
        name: &str,
        sequence: &StrategySequence,
        at: DateTime<Utc>,
    ) -> Result<SaveRequest, SaveError> {
        if self.is_pending() {
            return Err(SaveError::SaveInFlight);
        }
        if !sequence.can_save() {
            return Err(SaveError::ValidationFailed(sequence.findings().to_vec()));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(SaveError::EmptyName);
        }

        let document = StrategyDocument::snapshot(name, sequence, at);
        let fingerprint = SequenceHash::of(&document.blocks);
        info!(name, blocks = document.blocks.len(), hash = fingerprint.short(8), "save started");

        self.pending = Some(PendingSave {
            name: name.to_string(),
            fingerprint: fingerprint.clone(),
        });
        Ok(SaveRequest {
            document,
            fingerprint,
        })
    }

    /// Resolve the pending save with the gateway outcome and clear the flag.
    pub fn complete(&mut self, outcome: Result<SavedStrategy, GatewayError>) -> SaveNotice {
        let pending = self.pending.take();
        if pending.is_none() {
            warn!("save completed with no save pending");
        }
        let (name, fingerprint) = match pending {
            Some(p) => (p.name, p.fingerprint),
            None => (String::new(), SequenceHash(String::new())),
        };

        match outcome {
            Ok(saved) => {
                info!(name = %name, location = %saved.location, "save succeeded");
                SaveNotice::Saved {
                    id: saved.id(),
                    name,
                    location: saved.location,
                    fingerprint,
                }
            }
            Err(err) => {
                warn!(name = %name, error = %err, "save failed");
                SaveNotice::Failed {
                    name,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Synchronous begin → persist → complete.
    pub fn save_with(
        &mut self,
        gateway: &dyn PersistenceGateway,
        name: &str,
        sequence: &StrategySequence,
    ) -> Result<SaveNotice, SaveError> {
        let request = self.begin(name, sequence)?;
        let outcome = gateway.persist(&request.document);
        Ok(self.complete(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::domain::ParamValue;

    fn valid_sequence() -> StrategySequence {
        let c = Catalog::standard();
        let mut seq = StrategySequence::new();
        seq.add(c.get("rsi").unwrap());
        let cond = seq.add(c.get("less_than").unwrap());
        seq.set_parameter(&cond, "value", ParamValue::Number(30.0)).unwrap();
        seq.add(c.get("buy").unwrap());
        seq
    }

    #[test]
    fn begin_refuses_invalid_sequences() {
        let mut gate = SaveGate::new();
        let err = gate.begin("x", &StrategySequence::new()).unwrap_err();
        assert!(matches!(err, SaveError::ValidationFailed(f) if f.len() == 1));
        assert!(!gate.is_pending());
    }

    #[test]
    fn begin_refuses_blank_names() {
        let mut gate = SaveGate::new();
        assert_eq!(gate.begin("   ", &valid_sequence()).unwrap_err(), SaveError::EmptyName);
        assert!(!gate.is_pending());
    }

    #[test]
    fn second_begin_while_pending_is_refused() {
        let mut gate = SaveGate::new();
        let seq = valid_sequence();
        gate.begin("RSI dip", &seq).unwrap();
        assert!(!gate.can_save(&seq));
        assert_eq!(gate.begin("RSI dip", &seq).unwrap_err(), SaveError::SaveInFlight);
    }

    #[test]
    fn snapshot_timestamps_match() {
        let mut gate = SaveGate::new();
        let at = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let req = gate.begin_at(" Named ", &valid_sequence(), at).unwrap();
        assert_eq!(req.document.name, "Named");
        assert_eq!(req.document.created, at);
        assert_eq!(req.document.last_modified, at);
    }

    #[test]
    fn complete_clears_pending_on_either_outcome() {
        let mut gate = SaveGate::new();
        let seq = valid_sequence();

        gate.begin("a", &seq).unwrap();
        let notice = gate.complete(Err(GatewayError::Unreachable("down".into())));
        assert!(!notice.is_success());
        assert!(!gate.is_pending());

        let req = gate.begin("a", &seq).unwrap();
        let notice = gate.complete(Ok(SavedStrategy {
            location: "mem".into(),
            body: serde_json::json!({ "id": 7 }),
        }));
        match notice {
            SaveNotice::Saved { id, fingerprint, .. } => {
                assert_eq!(id.as_deref(), Some("7"));
                assert_eq!(fingerprint, req.fingerprint);
            }
            other => panic!("expected Saved, got {other:?}"),
        }
    }

    #[test]
    fn notice_messages() {
        let failed = SaveNotice::Failed {
            name: "a".into(),
            message: "HTTP 500".into(),
        };
        assert_eq!(failed.message(), "Failed to save 'a': HTTP 500");
    }
}
