//! Panel 2, Strategy: the ordered block sequence with parameters and a
//! per-block validity marker.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use blocklab_core::domain::BlockInstance;
use blocklab_core::validator::findings_for;

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::scroll_offset;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme, focused: bool) {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(app.strategy_name.clone(), theme.accent_bold()),
        Span::styled(
            format!("  {} block(s)", app.sequence.len()),
            theme.muted(),
        ),
    ]));
    if focused {
        lines.push(Line::from(Span::styled(
            "[j/k]select [J/K]move [Enter]params [d]remove",
            theme.muted(),
        )));
    }
    lines.push(Line::from(""));

    if app.sequence.is_empty() {
        lines.push(Line::from(Span::styled(
            "No blocks yet. Add some from the Blocks panel.",
            theme.muted(),
        )));
    }

    let header_rows = lines.len();
    let findings = app.sequence.findings();
    for (i, block) in app.sequence.blocks().iter().enumerate() {
        let issues = findings_for(findings, block).count();
        let is_cursor = i == app.sequence_cursor;
        lines.push(block_line(i, block, issues, is_cursor, focused, theme));
    }

    let cursor_line = header_rows + app.sequence_cursor;
    let offset = scroll_offset(cursor_line, area.height as usize);
    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset as u16, 0));
    f.render_widget(para, area);
}

fn block_line<'a>(
    index: usize,
    block: &'a BlockInstance,
    issues: usize,
    is_cursor: bool,
    focused: bool,
    theme: &Theme,
) -> Line<'a> {
    let marker = if issues == 0 {
        Span::styled(" ok ", theme.positive())
    } else {
        Span::styled(format!(" !{issues} "), theme.negative())
    };

    let name_style = if is_cursor && focused {
        theme.selected()
    } else {
        theme.text().fg(theme.kind_color(block.kind))
    };

    let params = block
        .parameters
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ");

    Line::from(vec![
        Span::styled(format!("{:>2}.", index + 1), theme.muted()),
        marker,
        Span::styled(block.display_name.as_str(), name_style),
        Span::styled(format!(" ({})", block.instance_id), theme.muted()),
        Span::raw("  "),
        Span::styled(params, theme.text()),
    ])
}
