//! Palette tokens for the block editor.
//!
//! The palette is derived from `ThemeMode` on every frame, so toggling the
//! mode re-styles the whole screen without any per-widget state.
//!
//! # Light (default)
//! - **Background**: pale lavender, white surfaces
//! - **Accent**: deep purple (focus, titles)
//! - **Secondary**: violet (selection, highlights)
//!
//! # Dark
//! - **Background**: near-black, charcoal surfaces
//! - **Accent**: soft blue
//! - **Secondary**: soft pink

use ratatui::style::{Color, Modifier, Style};

use blocklab_core::config::ThemeMode;
use blocklab_core::domain::BlockKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    /// Panel and overlay surface.
    pub surface: Color,
    pub accent: Color,
    /// Lighter accent used for unfocused titles.
    pub accent_soft: Color,
    pub secondary: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(243, 229, 245),
            surface: Color::Rgb(255, 255, 255),
            accent: Color::Rgb(106, 27, 154),
            accent_soft: Color::Rgb(156, 77, 204),
            secondary: Color::Rgb(123, 31, 162),
            positive: Color::Rgb(46, 125, 50),
            negative: Color::Rgb(198, 40, 40),
            warning: Color::Rgb(239, 108, 0),
            muted: Color::Rgb(120, 100, 130),
            text_primary: Color::Rgb(44, 0, 62),
            text_secondary: Color::Rgb(74, 0, 114),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(18, 18, 18),
            surface: Color::Rgb(30, 30, 30),
            accent: Color::Rgb(144, 202, 249),
            accent_soft: Color::Rgb(100, 149, 237),
            secondary: Color::Rgb(244, 143, 177),
            positive: Color::Rgb(129, 199, 132),
            negative: Color::Rgb(229, 115, 115),
            warning: Color::Rgb(255, 183, 77),
            muted: Color::Rgb(140, 140, 140),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    // ── Styles ───────────────────────────────────────────────────────

    pub fn base(&self) -> Style {
        Style::default().fg(self.text_primary).bg(self.surface)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        self.accent().add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn positive(&self) -> Style {
        Style::default().fg(self.positive)
    }

    pub fn negative(&self) -> Style {
        Style::default().fg(self.negative)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Highlighted row in a focused list.
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.surface)
            .bg(self.secondary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn panel_border(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn panel_title(&self, active: bool) -> Style {
        if active {
            self.accent_bold()
        } else {
            Style::default().fg(self.accent_soft)
        }
    }

    pub fn kind_color(&self, kind: BlockKind) -> Color {
        match kind {
            BlockKind::Indicator => self.accent,
            BlockKind::Condition => self.secondary,
            BlockKind::Action => self.positive,
        }
    }
}
