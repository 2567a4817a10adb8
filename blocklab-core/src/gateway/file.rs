//! Local-directory gateway: one pretty-printed JSON file per saved strategy.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{GatewayError, PersistenceGateway, SavedStrategy};
use crate::document::StrategyDocument;
use crate::fingerprint::SequenceHash;

pub struct JsonFileGateway {
    dir: PathBuf,
}

impl JsonFileGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<slug>-<hash8>.json`; identical content maps to the same file.
    pub fn file_name(document: &StrategyDocument) -> String {
        let hash = SequenceHash::of(&document.blocks);
        format!("{}-{}.json", slug(&document.name), hash.short(8))
    }
}

/// Lower-case alphanumerics, everything else collapsed to single dashes.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "strategy".to_string()
    } else {
        trimmed.to_string()
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn name(&self) -> &str {
        "json_file"
    }

    fn persist(&self, document: &StrategyDocument) -> Result<SavedStrategy, GatewayError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| GatewayError::Io(e.to_string()))?;
        let path = self.dir.join(Self::file_name(document));
        let json =
            serde_json::to_string_pretty(document).map_err(|e| GatewayError::Encode(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| GatewayError::Io(e.to_string()))?;
        info!(path = %path.display(), "strategy written");

        let body =
            serde_json::to_value(document).map_err(|e| GatewayError::Encode(e.to_string()))?;
        Ok(SavedStrategy {
            location: path.display().to_string(),
            body,
        })
    }
}
