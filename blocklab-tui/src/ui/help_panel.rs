//! Help overlay: keyboard shortcuts.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::theme::Theme;
use crate::ui::centered_rect;

pub fn render(f: &mut Frame, area: Rect, theme: &Theme) {
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent())
        .style(theme.base())
        .title(" Keyboard [any key]close ")
        .title_style(theme.accent_bold());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global", theme);
    key(&mut lines, "Tab / Shift+Tab", "Cycle panel focus", theme);
    key(&mut lines, "s", "Save (needs zero findings)", theme);
    key(&mut lines, "r", "Rename strategy", theme);
    key(&mut lines, "t", "Toggle light / dark theme", theme);
    key(&mut lines, "e", "Error history", theme);
    key(&mut lines, "?", "This help", theme);
    key(&mut lines, "q", "Quit", theme);
    lines.push(Line::from(""));

    section(&mut lines, "Blocks", theme);
    key(&mut lines, "j / k", "Move cursor", theme);
    key(&mut lines, "Enter", "Append block to strategy", theme);
    lines.push(Line::from(""));

    section(&mut lines, "Strategy", theme);
    key(&mut lines, "j / k", "Select block", theme);
    key(&mut lines, "J / K", "Move block down / up", theme);
    key(&mut lines, "Enter", "Edit parameters", theme);
    key(&mut lines, "d", "Remove block", theme);
    lines.push(Line::from(""));

    section(&mut lines, "Findings", theme);
    key(&mut lines, "j / k", "Select finding", theme);
    key(&mut lines, "Enter", "Jump to the block", theme);
    lines.push(Line::from(""));

    section(&mut lines, "Rules", theme);
    key(&mut lines, "Indicators", "period > 0", theme);
    key(&mut lines, "Cross conditions", "two indicators selected", theme);
    key(&mut lines, "Other conditions", "value set", theme);
    key(&mut lines, "Actions", "quantity > 0, right after a condition", theme);

    f.render_widget(Paragraph::new(lines), inner);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str, theme: &Theme) {
    lines.push(Line::from(Span::styled(title.to_string(), theme.accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str, theme: &Theme) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {keys:>18}  "), theme.accent()),
        Span::styled(desc.to_string(), theme.muted()),
    ]));
}
