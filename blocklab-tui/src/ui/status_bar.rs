//! Bottom status bar: strategy name, unsaved marker, save state, latest notice.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{AppState, StatusLevel};
use crate::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(format!(" {}", app.strategy_name), theme.accent_bold()));
    if app.is_dirty() {
        spans.push(Span::styled(" *", theme.warning()));
    }
    spans.push(Span::raw(" | "));

    if app.gate.is_pending() {
        spans.push(Span::styled("saving...", theme.warning()));
    } else if app.sequence.can_save() {
        spans.push(Span::styled("ready", theme.positive()));
    } else {
        spans.push(Span::styled(
            format!("{} issue(s)", app.sequence.findings().len()),
            theme.negative(),
        ));
    }
    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme.accent(),
            StatusLevel::Warning => theme.warning(),
            StatusLevel::Error => theme.negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
        spans.push(Span::raw(" | "));
    }

    spans.push(Span::styled(
        "s:save r:rename t:theme e:errors ?:help q:quit",
        theme.muted(),
    ));

    let para = Paragraph::new(Line::from(spans)).style(theme.base().bg(theme.background));
    f.render_widget(para, area);
}
