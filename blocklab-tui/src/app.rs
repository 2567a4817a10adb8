//! Application state: single-owner, main-thread only.
//!
//! All editor state lives here. The worker thread communicates via channels;
//! a save is the only thing that ever leaves this thread.

use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use blocklab_core::catalog::Catalog;
use blocklab_core::config::{BuilderConfig, ThemeMode};
use blocklab_core::domain::{BlockKind, InstanceId};
use blocklab_core::fingerprint::SequenceHash;
use blocklab_core::gateway::{GatewayError, SavedStrategy};
use blocklab_core::save_gate::{SaveError, SaveGate, SaveNotice};
use blocklab_core::schema;
use blocklab_core::sequence::StrategySequence;

use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

/// Which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Catalog,
    Sequence,
    Findings,
}

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Catalog => 0,
            Panel::Sequence => 1,
            Panel::Findings => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Catalog => "Blocks",
            Panel::Sequence => "Strategy",
            Panel::Findings => "Findings",
        }
    }

    pub fn next(self) -> Panel {
        match self {
            Panel::Catalog => Panel::Sequence,
            Panel::Sequence => Panel::Findings,
            Panel::Findings => Panel::Catalog,
        }
    }

    pub fn prev(self) -> Panel {
        match self {
            Panel::Catalog => Panel::Findings,
            Panel::Sequence => Panel::Catalog,
            Panel::Findings => Panel::Sequence,
        }
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Save,
    Edit,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Save => "SAVE",
            ErrorCategory::Edit => "EDIT",
            ErrorCategory::Other => "ERR",
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    Help,
    ErrorHistory,
    EditParams,
    Rename,
    /// Post-save view, shown once the success notice has been up long enough.
    Saved(SaveNotice),
}

/// Parameter editor for one block instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEditor {
    pub instance_id: InstanceId,
    /// Existing keys plus any required by the schema, sorted.
    pub keys: Vec<String>,
    pub field: usize,
    pub input: String,
}

impl ParamEditor {
    pub fn selected_key(&self) -> Option<&str> {
        self.keys.get(self.field).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct PostSave {
    due: Instant,
    notice: SaveNotice,
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,
    pub theme: ThemeMode,

    // Editing session
    pub catalog: Catalog,
    pub sequence: StrategySequence,
    pub strategy_name: String,
    pub gate: SaveGate,
    pub last_saved: Option<SequenceHash>,

    // Cursors
    pub catalog_cursor: usize,
    pub sequence_cursor: usize,
    pub findings_cursor: usize,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub param_editor: Option<ParamEditor>,
    pub rename_input: String,
    post_save: Option<PostSave>,
    post_save_delay: Duration,

    pub state_path: PathBuf,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        config: &BuilderConfig,
        state_path: PathBuf,
    ) -> Self {
        Self {
            active_panel: Panel::Catalog,
            running: true,
            theme: config.theme,
            catalog: Catalog::standard(),
            sequence: StrategySequence::new(),
            strategy_name: config.default_strategy_name.clone(),
            gate: SaveGate::new(),
            last_saved: None,
            catalog_cursor: 0,
            sequence_cursor: 0,
            findings_cursor: 0,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            param_editor: None,
            rename_input: String::new(),
            post_save: None,
            post_save_delay: Duration::from_millis(config.post_save_delay_ms),
            state_path,
        }
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    /// Blocks differ from the last successful save (or were never saved).
    pub fn is_dirty(&self) -> bool {
        match &self.last_saved {
            Some(hash) => *hash != self.sequence.fingerprint(),
            None => !self.sequence.is_empty(),
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        self.set_status(format!("Theme: {}", self.theme.label()));
    }

    // ── Sequence editing ─────────────────────────────────────────────

    /// Append the template under the catalog cursor.
    pub fn add_selected_template(&mut self) {
        let Some(template) = self.catalog.templates().get(self.catalog_cursor) else {
            return;
        };
        let name = template.display_name.clone();
        let id = self.sequence.add(template);
        self.sequence_cursor = self.sequence.len() - 1;
        self.clamp_cursors();
        self.set_status(format!("Added {name} ({id})"));
    }

    pub fn remove_selected(&mut self) {
        match self.sequence.remove(self.sequence_cursor) {
            Ok(removed) => {
                self.clamp_cursors();
                self.set_status(format!("Removed {}", removed.display_name));
            }
            Err(e) => self.set_warning(e.to_string()),
        }
    }

    /// Move the selected block by `delta` positions, keeping it selected.
    pub fn move_selected(&mut self, delta: isize) {
        let from = self.sequence_cursor;
        let Some(to) = from.checked_add_signed(delta) else {
            return;
        };
        if to >= self.sequence.len() {
            return;
        }
        match self.sequence.reorder(from, to) {
            Ok(()) => {
                self.sequence_cursor = to;
                self.clamp_cursors();
            }
            Err(e) => self.set_warning(e.to_string()),
        }
    }

    /// Keep both list cursors inside their lists after the sequence changes.
    pub(crate) fn clamp_cursors(&mut self) {
        self.sequence_cursor = self
            .sequence_cursor
            .min(self.sequence.len().saturating_sub(1));
        self.findings_cursor = self
            .findings_cursor
            .min(self.sequence.findings().len().saturating_sub(1));
    }

    /// Open the parameter editor on the selected block.
    pub fn open_param_editor(&mut self) {
        let Some(block) = self.sequence.get(self.sequence_cursor) else {
            self.set_warning("No block selected");
            return;
        };
        let mut keys: BTreeSet<String> = block.parameters.keys().cloned().collect();
        keys.extend(
            schema::required_fields(block.kind, &block.display_name).map(|f| f.key.to_string()),
        );
        let keys: Vec<String> = keys.into_iter().collect();
        let input = keys
            .first()
            .and_then(|k| block.param(k))
            .map(|v| v.to_string())
            .unwrap_or_default();

        self.param_editor = Some(ParamEditor {
            instance_id: block.instance_id.clone(),
            keys,
            field: 0,
            input,
        });
        self.overlay = Overlay::EditParams;
    }

    /// Select another field in the open editor and load its current value.
    pub fn select_param_field(&mut self, delta: isize) {
        let Some(editor) = self.param_editor.as_mut() else {
            return;
        };
        if editor.keys.is_empty() {
            return;
        }
        let len = editor.keys.len() as isize;
        editor.field = (editor.field as isize + delta).rem_euclid(len) as usize;
        let current = self
            .sequence
            .position(&editor.instance_id)
            .and_then(|i| self.sequence.get(i))
            .and_then(|b| b.param(&editor.keys[editor.field]))
            .map(|v| v.to_string());
        editor.input = current.unwrap_or_default();
    }

    /// Parse the editor input per the schema and write it to the block.
    pub fn commit_param_edit(&mut self) {
        let Some(editor) = self.param_editor.clone() else {
            return;
        };
        let Some(key) = editor.selected_key() else {
            return;
        };
        let Some(block) = self
            .sequence
            .position(&editor.instance_id)
            .and_then(|i| self.sequence.get(i))
        else {
            self.close_param_editor();
            self.push_error(
                ErrorCategory::Edit,
                format!("Block {} no longer exists", editor.instance_id),
                key.to_string(),
            );
            return;
        };

        let expected = schema::expected_type(block.kind, &block.display_name, key);
        let value = match schema::parse_input(expected, &editor.input) {
            Ok(v) => v,
            Err(msg) => {
                self.set_warning(msg);
                return;
            }
        };
        match self.sequence.set_parameter(&editor.instance_id, key, value) {
            Ok(()) => {
                self.clamp_cursors();
                self.set_status(format!("{} {key} = {}", editor.instance_id, editor.input.trim()));
            }
            Err(e) => self.push_error(ErrorCategory::Edit, e.to_string(), key.to_string()),
        }
    }

    pub fn close_param_editor(&mut self) {
        self.param_editor = None;
        self.overlay = Overlay::None;
    }

    /// Instance ids of indicators, for reference-field hints.
    pub fn indicator_ids(&self) -> Vec<&InstanceId> {
        self.sequence
            .blocks()
            .iter()
            .filter(|b| b.kind == BlockKind::Indicator)
            .map(|b| &b.instance_id)
            .collect()
    }

    // ── Rename ───────────────────────────────────────────────────────

    pub fn open_rename(&mut self) {
        self.rename_input = self.strategy_name.clone();
        self.overlay = Overlay::Rename;
    }

    pub fn commit_rename(&mut self) {
        let name = self.rename_input.trim();
        if name.is_empty() {
            self.set_warning("Strategy name must not be empty");
            return;
        }
        self.strategy_name = name.to_string();
        self.overlay = Overlay::None;
        self.set_status(format!("Renamed to '{}'", self.strategy_name));
    }

    // ── Saving ───────────────────────────────────────────────────────

    /// Capture a snapshot and hand it to the worker, if the gate allows.
    pub fn request_save(&mut self) {
        let request = match self.gate.begin(&self.strategy_name, &self.sequence) {
            Ok(r) => r,
            Err(SaveError::ValidationFailed(findings)) => {
                self.set_warning(format!(
                    "Cannot save: {} finding(s) to resolve",
                    findings.len()
                ));
                return;
            }
            Err(e) => {
                self.set_warning(format!("Cannot save: {e}"));
                return;
            }
        };

        if self.worker_tx.send(WorkerCommand::Save(request)).is_err() {
            warn!("worker channel closed; save abandoned");
            let outcome = Err(GatewayError::Io("background worker is not running".into()));
            self.finish_save(outcome, Instant::now());
            return;
        }
        self.set_status(format!("Saving '{}'...", self.strategy_name));
    }

    pub fn handle_worker_response(&mut self, resp: WorkerResponse, now: Instant) {
        match resp {
            WorkerResponse::SaveFinished { outcome } => self.finish_save(outcome, now),
        }
    }

    fn finish_save(&mut self, outcome: Result<SavedStrategy, GatewayError>, now: Instant) {
        let notice = self.gate.complete(outcome);
        if let SaveNotice::Failed { name, message } = &notice {
            self.push_error(ErrorCategory::Save, message.clone(), format!("saving '{name}'"));
            return;
        }
        if let SaveNotice::Saved { fingerprint, .. } = &notice {
            self.last_saved = Some(fingerprint.clone());
        }
        self.set_status(notice.message());
        self.post_save = Some(PostSave {
            due: now + self.post_save_delay,
            notice,
        });
    }

    /// Advance timers. Shows the post-save view once its delay has passed
    /// and no other overlay is open.
    pub fn tick(&mut self, now: Instant) {
        let due = self
            .post_save
            .as_ref()
            .is_some_and(|p| now >= p.due && self.overlay == Overlay::None);
        if due {
            if let Some(post) = self.post_save.take() {
                info!("showing post-save view");
                self.overlay = Overlay::Saved(post.notice);
            }
        }
    }

    pub fn post_save_scheduled(&self) -> bool {
        self.post_save.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use blocklab_core::domain::ParamValue;

    fn app() -> (AppState, mpsc::Receiver<WorkerCommand>, mpsc::Sender<WorkerResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(cmd_tx, resp_rx, &BuilderConfig::default(), PathBuf::from("."));
        (app, cmd_rx, resp_tx)
    }

    fn add(app: &mut AppState, template: &str) -> InstanceId {
        let template = app.catalog.get(template).unwrap().clone();
        app.sequence.add(&template)
    }

    fn make_valid(app: &mut AppState) {
        add(app, "rsi");
        let cond = add(app, "less_than");
        app.sequence
            .set_parameter(&cond, "value", ParamValue::Number(30.0))
            .unwrap();
        add(app, "buy");
    }

    fn saved(id: &str) -> Result<SavedStrategy, GatewayError> {
        Ok(SavedStrategy {
            location: "http://localhost:5000/api/strategies".into(),
            body: serde_json::json!({ "id": id }),
        })
    }

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Catalog.next(), Panel::Sequence);
        assert_eq!(Panel::Findings.next(), Panel::Catalog);
        assert_eq!(Panel::Catalog.prev(), Panel::Findings);
        for p in [Panel::Catalog, Panel::Sequence, Panel::Findings] {
            assert_eq!(p.next().prev(), p);
        }
    }

    #[test]
    fn error_history_caps_at_50() {
        let (mut app, _rx, _tx) = app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn starts_from_config_defaults() {
        let (app, _rx, _tx) = app();
        assert_eq!(app.strategy_name, "Untitled Strategy");
        assert_eq!(app.theme, ThemeMode::Light);
        assert!(!app.is_dirty());
        assert_eq!(app.sequence.findings().len(), 1);
    }

    #[test]
    fn add_and_remove_follow_cursors() {
        let (mut app, _rx, _tx) = app();
        app.catalog_cursor = 2;
        app.add_selected_template();
        app.add_selected_template();
        assert_eq!(app.sequence.len(), 2);
        assert_eq!(app.sequence_cursor, 1);

        app.remove_selected();
        assert_eq!(app.sequence.len(), 1);
        assert_eq!(app.sequence_cursor, 0);

        app.remove_selected();
        app.remove_selected();
        assert!(app.sequence.is_empty());
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
    }

    #[test]
    fn move_selected_stays_in_bounds() {
        let (mut app, _rx, _tx) = app();
        let first = add(&mut app, "sma");
        add(&mut app, "buy");

        app.sequence_cursor = 0;
        app.move_selected(-1);
        assert_eq!(app.sequence.blocks()[0].instance_id, first);

        app.move_selected(1);
        assert_eq!(app.sequence.blocks()[1].instance_id, first);
        assert_eq!(app.sequence_cursor, 1);

        app.move_selected(1);
        assert_eq!(app.sequence_cursor, 1);
    }

    #[test]
    fn param_editor_includes_schema_fields_and_parses() {
        let (mut app, _rx, _tx) = app();
        let id = add(&mut app, "sma");
        app.open_param_editor();

        let editor = app.param_editor.clone().unwrap();
        assert_eq!(editor.keys, vec!["period".to_string()]);
        assert_eq!(editor.input, "20");
        assert_eq!(app.overlay, Overlay::EditParams);

        app.param_editor.as_mut().unwrap().input = "abc".into();
        app.commit_param_edit();
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
        assert_eq!(app.sequence.blocks()[0].param("period"), Some(&ParamValue::Number(20.0)));

        app.param_editor.as_mut().unwrap().input = "0".into();
        app.commit_param_edit();
        assert_eq!(app.sequence.blocks()[0].param("period"), Some(&ParamValue::Number(0.0)));
        assert!(app.sequence.findings().iter().any(|f| f.concerns(&id)));
    }

    #[test]
    fn reference_fields_stay_text() {
        let (mut app, _rx, _tx) = app();
        add(&mut app, "cross_above");
        app.open_param_editor();
        app.select_param_field(1);
        assert_eq!(app.param_editor.as_ref().unwrap().selected_key(), Some("indicator2"));

        app.param_editor.as_mut().unwrap().input = "42".into();
        app.commit_param_edit();
        assert_eq!(app.sequence.blocks()[0].param("indicator2"), Some(&ParamValue::text("42")));
    }

    #[test]
    fn rename_rejects_blank() {
        let (mut app, _rx, _tx) = app();
        app.open_rename();
        app.rename_input = "   ".into();
        app.commit_rename();
        assert_eq!(app.overlay, Overlay::Rename);
        assert_eq!(app.strategy_name, "Untitled Strategy");

        app.rename_input = " Golden ".into();
        app.commit_rename();
        assert_eq!(app.strategy_name, "Golden");
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn save_with_findings_sends_nothing() {
        let (mut app, cmd_rx, _tx) = app();
        app.request_save();
        assert!(cmd_rx.try_recv().is_err());

        // Buy straight after an indicator.
        add(&mut app, "sma");
        add(&mut app, "buy");
        assert!(!app.sequence.findings().is_empty());
        app.request_save();
        assert!(cmd_rx.try_recv().is_err());
        assert!(!app.gate.is_pending());
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
    }

    #[test]
    fn findings_cursor_follows_shrinking_findings() {
        let (mut app, _rx, _tx) = app();
        add(&mut app, "sma");
        add(&mut app, "greater_than");
        let buy = add(&mut app, "buy");
        app.sequence
            .set_parameter(&buy, "quantity", ParamValue::Number(0.0))
            .unwrap();
        assert_eq!(app.sequence.findings().len(), 2);
        app.findings_cursor = 1;

        // Removing the last block drops its finding.
        app.sequence_cursor = 2;
        app.remove_selected();
        assert_eq!(app.sequence.findings().len(), 1);
        assert_eq!(app.findings_cursor, 0);

        app.sequence_cursor = 1;
        app.open_param_editor();
        app.select_param_field(1);
        app.param_editor.as_mut().unwrap().input = "30".into();
        app.commit_param_edit();
        assert!(app.sequence.findings().is_empty());
        assert_eq!(app.findings_cursor, 0);
    }

    #[test]
    fn second_save_while_pending_sends_nothing() {
        let (mut app, cmd_rx, _tx) = app();
        make_valid(&mut app);

        app.request_save();
        assert!(matches!(cmd_rx.try_recv(), Ok(WorkerCommand::Save(_))));
        assert!(app.gate.is_pending());

        app.request_save();
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn successful_save_shows_view_after_delay() {
        let (mut app, cmd_rx, _tx) = app();
        make_valid(&mut app);
        assert!(app.is_dirty());
        app.request_save();
        let _ = cmd_rx.try_recv();

        let t0 = Instant::now();
        app.handle_worker_response(WorkerResponse::SaveFinished { outcome: saved("42") }, t0);
        assert!(!app.gate.is_pending());
        assert!(!app.is_dirty());
        assert!(app.post_save_scheduled());

        app.tick(t0 + Duration::from_millis(100));
        assert_eq!(app.overlay, Overlay::None);

        app.tick(t0 + Duration::from_millis(1500));
        match &app.overlay {
            Overlay::Saved(notice) => assert!(notice.message().contains("42")),
            other => panic!("expected post-save view, got {other:?}"),
        }
        assert!(!app.post_save_scheduled());
    }

    #[test]
    fn post_save_view_waits_for_open_overlay() {
        let (mut app, _cmd_rx, _tx) = app();
        make_valid(&mut app);
        app.request_save();

        let t0 = Instant::now();
        app.handle_worker_response(WorkerResponse::SaveFinished { outcome: saved("1") }, t0);
        app.overlay = Overlay::Help;
        app.tick(t0 + Duration::from_secs(5));
        assert_eq!(app.overlay, Overlay::Help);

        app.overlay = Overlay::None;
        app.tick(t0 + Duration::from_secs(5));
        assert!(matches!(app.overlay, Overlay::Saved(_)));
    }

    #[test]
    fn failed_save_keeps_sequence_editable() {
        let (mut app, _cmd_rx, _tx) = app();
        make_valid(&mut app);
        app.request_save();
        let before = app.sequence.fingerprint();

        let outcome = Err(GatewayError::Unreachable("connection refused".into()));
        app.handle_worker_response(WorkerResponse::SaveFinished { outcome }, Instant::now());

        assert!(!app.gate.is_pending());
        assert!(!app.post_save_scheduled());
        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::Save);
        assert_eq!(app.sequence.fingerprint(), before);
        assert!(app.is_dirty());
        assert!(app.gate.can_save(&app.sequence));
    }

    #[test]
    fn dead_worker_fails_the_save_immediately() {
        let (mut app, cmd_rx, _tx) = app();
        drop(cmd_rx);
        make_valid(&mut app);
        app.request_save();
        assert!(!app.gate.is_pending());
        assert_eq!(app.error_history.len(), 1);
    }

    #[test]
    fn edits_after_save_mark_dirty() {
        let (mut app, _cmd_rx, _tx) = app();
        make_valid(&mut app);
        app.request_save();
        app.handle_worker_response(WorkerResponse::SaveFinished { outcome: saved("7") }, Instant::now());
        assert!(!app.is_dirty());

        add(&mut app, "sell");
        assert!(app.is_dirty());
    }
}
