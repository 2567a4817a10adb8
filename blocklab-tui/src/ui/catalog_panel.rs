//! Panel 1, Blocks: the template catalog grouped by kind.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use blocklab_core::domain::BlockKind;

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::scroll_offset;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme, focused: bool) {
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line = 0;

    let mut current_kind: Option<BlockKind> = None;
    for (i, template) in app.catalog.templates().iter().enumerate() {
        if current_kind != Some(template.kind) {
            if current_kind.is_some() {
                lines.push(Line::from(""));
            }
            current_kind = Some(template.kind);
            lines.push(Line::from(Span::styled(
                format!("{}s", template.kind.label()),
                theme.accent_bold().fg(theme.kind_color(template.kind)),
            )));
        }

        let is_cursor = i == app.catalog_cursor;
        if is_cursor {
            cursor_line = lines.len();
        }
        let style = if is_cursor && focused {
            theme.selected()
        } else if is_cursor {
            theme.accent()
        } else {
            theme.text()
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(template.display_name.clone(), style),
        ]));
    }

    if focused {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("[Enter]add", theme.muted())));
    }

    let offset = scroll_offset(cursor_line, area.height as usize);
    let para = Paragraph::new(lines).scroll((offset as u16, 0));
    f.render_widget(para, area);
}
