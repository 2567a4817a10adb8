//! Panel 3, Findings: what is stopping the strategy from being saved.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::app::AppState;
use crate::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme, focused: bool) {
    let findings = app.sequence.findings();
    let mut lines: Vec<Line> = Vec::new();

    if findings.is_empty() {
        lines.push(Line::from(Span::styled("Ready to save", theme.positive())));
        lines.push(Line::from(Span::styled("[s]save", theme.muted())));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    lines.push(Line::from(Span::styled(
        format!("{} issue(s)", findings.len()),
        theme.negative(),
    )));
    if focused {
        lines.push(Line::from(Span::styled("[Enter]go to block", theme.muted())));
    }
    lines.push(Line::from(""));

    let selected_block = app
        .sequence
        .get(app.sequence_cursor)
        .map(|b| &b.instance_id);

    for (i, finding) in findings.iter().enumerate() {
        let label = match &finding.instance_id {
            Some(id) => id.to_string(),
            None => "strategy".to_string(),
        };
        let touches_selection = finding.instance_id.as_ref() == selected_block;
        let style = if focused && i == app.findings_cursor {
            theme.selected()
        } else if touches_selection {
            theme.warning()
        } else {
            theme.text()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("[{label}] "), theme.muted()),
            Span::styled(finding.message.as_str(), style),
        ]));
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(para, area);
}
