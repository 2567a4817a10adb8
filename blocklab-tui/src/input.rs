//! Keyboard input dispatch: overlays → global keys → panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Overlay, Panel};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::EditParams => {
            handle_param_editor(app, key);
            return;
        }
        Overlay::Rename => {
            handle_rename(app, key);
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Help | Overlay::Saved(_) => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('s') => {
            app.request_save();
            return;
        }
        KeyCode::Char('r') => {
            app.open_rename();
            return;
        }
        KeyCode::Char('t') => {
            app.toggle_theme();
            return;
        }
        KeyCode::Char('?') => {
            app.overlay = Overlay::Help;
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Catalog => handle_catalog_key(app, key),
        Panel::Sequence => handle_sequence_key(app, key),
        Panel::Findings => handle_findings_key(app, key),
    }
}

fn handle_catalog_key(app: &mut AppState, key: KeyEvent) {
    let count = app.catalog.len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.catalog_cursor + 1 < count {
                app.catalog_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.catalog_cursor = app.catalog_cursor.saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char('a') => app.add_selected_template(),
        _ => {}
    }
}

fn handle_sequence_key(app: &mut AppState, key: KeyEvent) {
    let count = app.sequence.len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.sequence_cursor + 1 < count {
                app.sequence_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.sequence_cursor = app.sequence_cursor.saturating_sub(1);
        }
        KeyCode::Char('J') => app.move_selected(1),
        KeyCode::Char('K') => app.move_selected(-1),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
        KeyCode::Enter => app.open_param_editor(),
        _ => {}
    }
}

fn handle_findings_key(app: &mut AppState, key: KeyEvent) {
    let count = app.sequence.findings().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.findings_cursor + 1 < count {
                app.findings_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.findings_cursor = app.findings_cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            // Jump to the block the finding points at.
            let target = app
                .sequence
                .findings()
                .get(app.findings_cursor)
                .and_then(|f| f.instance_id.as_ref())
                .and_then(|id| app.sequence.position(id));
            if let Some(index) = target {
                app.sequence_cursor = index;
                app.active_panel = Panel::Sequence;
            }
        }
        _ => {}
    }
}

fn handle_param_editor(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_param_editor(),
        KeyCode::Enter => app.commit_param_edit(),
        KeyCode::Up | KeyCode::BackTab => app.select_param_field(-1),
        KeyCode::Down | KeyCode::Tab => app.select_param_field(1),
        KeyCode::Backspace => {
            if let Some(editor) = app.param_editor.as_mut() {
                editor.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(editor) = app.param_editor.as_mut() {
                editor.input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_rename(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.rename_input.clear();
            app.overlay = Overlay::None;
        }
        KeyCode::Enter => app.commit_rename(),
        KeyCode::Backspace => {
            app.rename_input.pop();
        }
        KeyCode::Char(c) => app.rename_input.push(c),
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}
