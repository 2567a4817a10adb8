//! Strategy documents: the serialized form of a sequence.
//!
//! The same shape is the gateway payload and the draft file format:
//! `{ name, blocks, created, lastModified }` with RFC 3339 UTC timestamps.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::domain::BlockInstance;
use crate::sequence::{SequenceError, StrategySequence};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed strategy document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown block template: {0}")]
    UnknownTemplate(String),

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// A named, timestamped snapshot of a block sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDocument {
    pub name: String,
    pub blocks: Vec<BlockInstance>,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl StrategyDocument {
    /// Snapshot `sequence` with both timestamps set to `at`.
    pub fn snapshot(name: impl Into<String>, sequence: &StrategySequence, at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            blocks: sequence.blocks().to_vec(),
            created: at,
            last_modified: at,
        }
    }

    /// Build a draft from catalog template ids, in order.
    pub fn from_templates(
        name: impl Into<String>,
        catalog: &Catalog,
        template_ids: &[&str],
    ) -> Result<Self, DocumentError> {
        let mut sequence = StrategySequence::new();
        for id in template_ids {
            let template = catalog
                .get(id)
                .ok_or_else(|| DocumentError::UnknownTemplate(id.to_string()))?;
            sequence.add(template);
        }
        Ok(Self::snapshot(name, &sequence, Utc::now()))
    }

    /// Rebuild an editable sequence from this document.
    pub fn to_sequence(&self) -> Result<StrategySequence, SequenceError> {
        StrategySequence::from_blocks(self.blocks.clone())
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write pretty JSON, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let io_err = |source: std::io::Error| DocumentError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_camel_case_and_iso_timestamps() {
        let doc = StrategyDocument::from_templates("Golden", &Catalog::standard(), &["sma", "buy"])
            .unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["name"], "Golden");
        assert_eq!(value["blocks"].as_array().unwrap().len(), 2);
        let created = value["created"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
        assert_eq!(value["created"], value["lastModified"]);
    }

    #[test]
    fn unknown_template_is_rejected() {
        let err = StrategyDocument::from_templates("x", &Catalog::standard(), &["sma", "warp"])
            .unwrap_err();
        assert!(matches!(err, DocumentError::UnknownTemplate(id) if id == "warp"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drafts").join("golden.json");
        let doc = StrategyDocument::from_templates(
            "Golden",
            &Catalog::standard(),
            &["sma", "ema", "cross_above", "buy"],
        )
        .unwrap();
        doc.save(&path).unwrap();

        let loaded = StrategyDocument::load(&path).unwrap();
        assert_eq!(loaded, doc);
        assert_eq!(loaded.to_sequence().unwrap().len(), 4);
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json {{").unwrap();
        assert!(matches!(
            StrategyDocument::load(&path),
            Err(DocumentError::Parse(_))
        ));
    }
}
