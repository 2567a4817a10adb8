//! Top-level UI layout: catalog, sequence and findings side by side, with a
//! status bar underneath.

pub mod catalog_panel;
pub mod findings_panel;
pub mod help_panel;
pub mod overlays;
pub mod sequence_panel;
pub mod status_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};

use crate::app::{AppState, Overlay, Panel};
use crate::theme::Theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let theme = Theme::for_mode(app.theme);
    f.render_widget(
        Block::default().style(theme.base().bg(theme.background)),
        f.area(),
    );

    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());
    let main_area = chunks[0];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(45),
            Constraint::Percentage(30),
        ])
        .split(main_area);

    for (panel, area) in [Panel::Catalog, Panel::Sequence, Panel::Findings]
        .into_iter()
        .zip(columns.iter().copied())
    {
        draw_panel(f, area, app, &theme, panel);
    }

    status_bar::render(f, chunks[1], app, &theme);

    // Overlays on top.
    match &app.overlay {
        Overlay::Help => help_panel::render(f, main_area, &theme),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app, &theme),
        Overlay::EditParams => overlays::render_param_editor(f, main_area, app, &theme),
        Overlay::Rename => overlays::render_rename(f, main_area, &app.rename_input, &theme),
        Overlay::Saved(notice) => overlays::render_saved(f, main_area, app, notice, &theme),
        Overlay::None => {}
    }
}

/// Draw one panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme, panel: Panel) {
    let is_active = app.active_panel == panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border(is_active))
        .style(theme.base())
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme.panel_title(is_active));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Catalog => catalog_panel::render(f, inner, app, theme, is_active),
        Panel::Sequence => sequence_panel::render(f, inner, app, theme, is_active),
        Panel::Findings => findings_panel::render(f, inner, app, theme, is_active),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// First row to show so that `cursor` stays inside a window of `height` rows.
pub fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        0
    } else {
        cursor.saturating_sub(height - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::time::Instant;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use blocklab_core::config::BuilderConfig;
    use blocklab_core::gateway::SavedStrategy;

    use crate::worker::{WorkerCommand, WorkerResponse};

    fn app() -> (AppState, mpsc::Receiver<WorkerCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(cmd_tx, resp_rx, &BuilderConfig::default(), PathBuf::from("."));
        (app, cmd_rx)
    }

    fn render(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn scroll_keeps_cursor_visible() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(12, 10), 3);
        assert_eq!(scroll_offset(5, 0), 0);
    }

    #[test]
    fn empty_editor_renders_all_panels() {
        let (app, _rx) = app();
        let screen = render(&app);
        assert!(screen.contains("Blocks [1]"));
        assert!(screen.contains("Strategy [2]"));
        assert!(screen.contains("Findings [3]"));
        // The findings column wraps long messages.
        assert!(screen.contains("1 issue(s)"));
        assert!(screen.contains("[strategy] Strategy must"));
        assert!(screen.contains("Untitled Strategy"));
    }

    #[test]
    fn every_overlay_renders_in_both_themes() {
        let (mut app, _rx) = app();
        app.sequence.add(app.catalog.get("cross_above").unwrap());
        app.push_error(crate::app::ErrorCategory::Other, "boom".into(), "ctx".into());

        for _ in 0..2 {
            app.overlay = Overlay::Help;
            assert!(render(&app).contains("Keyboard"));

            app.overlay = Overlay::ErrorHistory;
            assert!(render(&app).contains("boom"));

            app.open_param_editor();
            assert!(render(&app).contains("indicator1"));
            app.close_param_editor();

            app.open_rename();
            assert!(render(&app).contains("Rename"));
            app.overlay = Overlay::None;

            app.toggle_theme();
        }
    }

    #[test]
    fn saved_view_renders_notice() {
        let (mut app, _rx) = app();
        app.sequence.add(app.catalog.get("sma").unwrap());
        app.request_save();
        let outcome = Ok(SavedStrategy {
            location: "http://localhost:5000/api/strategies".into(),
            body: serde_json::json!({ "id": 99 }),
        });
        let t0 = Instant::now();
        app.handle_worker_response(WorkerResponse::SaveFinished { outcome }, t0);
        app.tick(t0 + std::time::Duration::from_secs(2));

        let screen = render(&app);
        assert!(screen.contains("Strategy Saved"));
        assert!(screen.contains("99"));
    }
}
