//! Overlay widgets: parameter editor, rename, error history, post-save view.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use blocklab_core::save_gate::SaveNotice;
use blocklab_core::schema::{self, ParamType};

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::centered_rect;

fn popup_block<'a>(title: String, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent())
        .style(theme.base())
        .title(title)
        .title_style(theme.accent_bold())
}

/// Parameter editor for the selected block.
pub fn render_param_editor(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let Some(editor) = &app.param_editor else {
        return;
    };
    let popup = centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    let block = popup_block(
        format!(" Parameters: {} [Up/Down]field [Enter]apply [Esc]close ", editor.instance_id),
        theme,
    );
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let Some(instance) = app
        .sequence
        .position(&editor.instance_id)
        .and_then(|i| app.sequence.get(i))
    else {
        let text = Paragraph::new(Span::styled("Block no longer exists.", theme.muted()));
        f.render_widget(text, inner);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("{} ({})", instance.display_name, instance.kind),
        theme.accent_bold(),
    )));
    lines.push(Line::from(""));

    for (i, key) in editor.keys.iter().enumerate() {
        let current = instance
            .param(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "(unset)".to_string());
        let is_active = i == editor.field;
        let style = if is_active {
            theme.accent().add_modifier(Modifier::REVERSED)
        } else {
            theme.muted()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{key:>12}: "), style),
            Span::styled(current, theme.text()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("> ", theme.accent()),
        Span::styled(editor.input.as_str(), theme.accent_bold()),
        Span::styled("_", theme.accent()),
    ]));

    let expected = editor
        .selected_key()
        .and_then(|k| schema::expected_type(instance.kind, &instance.display_name, k));
    let hint = match expected {
        Some(ParamType::PositiveNumber) => "number greater than 0".to_string(),
        Some(ParamType::Reference) => {
            let ids = app
                .indicator_ids()
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>();
            if ids.is_empty() {
                "indicator id (no indicators in the strategy yet)".to_string()
            } else {
                format!("indicator id: {}", ids.join(", "))
            }
        }
        Some(ParamType::Scalar) => "number or text".to_string(),
        None => "free-form value".to_string(),
    };
    lines.push(Line::from(Span::styled(hint, theme.muted())));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(para, inner);
}

pub fn render_rename(f: &mut Frame, area: Rect, input: &str, theme: &Theme) {
    let popup = centered_rect(50, 20, area);
    f.render_widget(Clear, popup);

    let block = popup_block(" Rename Strategy [Enter]apply [Esc]cancel ".to_string(), theme);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", theme.accent()),
            Span::styled(input, theme.accent_bold()),
            Span::styled("_", theme.accent()),
        ]),
    ];
    f.render_widget(Paragraph::new(text), inner);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.negative())
        .style(theme.base())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme.negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme.muted()));
        f.render_widget(text, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
    {
        let style = if i == app.error_scroll {
            theme.negative().add_modifier(Modifier::BOLD)
        } else {
            theme.muted()
        };

        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", err.timestamp.format("%H:%M:%S")), theme.muted()),
            Span::styled(format!("[{}] ", err.category.label()), theme.warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme.muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// Post-save view: what was stored and where.
pub fn render_saved(f: &mut Frame, area: Rect, app: &AppState, notice: &SaveNotice, theme: &Theme) {
    let popup = centered_rect(60, 40, area);
    f.render_widget(Clear, popup);

    let block = popup_block(" Strategy Saved [any key]back to editor ".to_string(), theme);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(notice.message(), theme.positive())),
        Line::from(""),
    ];
    if let SaveNotice::Saved {
        name,
        id,
        location,
        fingerprint,
    } = notice
    {
        field(&mut lines, "Name", name, theme);
        field(&mut lines, "Id", id.as_deref().unwrap_or("-"), theme);
        field(&mut lines, "Location", location, theme);
        field(&mut lines, "Fingerprint", fingerprint.short(16), theme);
    }
    field(&mut lines, "Blocks", &app.sequence.len().to_string(), theme);

    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(para, inner);
}

fn field<'a>(lines: &mut Vec<Line<'a>>, label: &str, value: &str, theme: &Theme) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {label:>12}: "), theme.muted()),
        Span::styled(value.to_string(), theme.accent()),
    ]));
}
