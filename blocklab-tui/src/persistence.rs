//! Editing-session persistence: JSON save/load across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use blocklab_core::config::ThemeMode;
use blocklab_core::domain::BlockInstance;
use blocklab_core::sequence::StrategySequence;

use crate::app::AppState;

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedState {
    pub theme: Option<ThemeMode>,
    pub strategy_name: Option<String>,
    pub blocks: Vec<BlockInstance>,
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring corrupt state file");
            PersistedState::default()
        }),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        theme: Some(app.theme),
        strategy_name: Some(app.strategy_name.clone()),
        blocks: app.sequence.blocks().to_vec(),
    }
}

/// Apply persisted state to AppState. Fields that were never saved keep the
/// values the app was built with.
pub fn apply(app: &mut AppState, state: PersistedState) {
    if let Some(theme) = state.theme {
        app.theme = theme;
    }
    if let Some(name) = state.strategy_name.filter(|n| !n.trim().is_empty()) {
        app.strategy_name = name;
    }
    match StrategySequence::from_blocks(state.blocks) {
        Ok(sequence) => app.sequence = sequence,
        Err(e) => {
            warn!(error = %e, "discarding saved blocks");
            app.set_warning(format!("Saved session discarded: {e}"));
        }
    }
    app.sequence_cursor = 0;
    app.findings_cursor = 0;
}
