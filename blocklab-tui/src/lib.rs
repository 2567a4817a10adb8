//! BlockLab TUI: keyboard-driven strategy block editor.
//!
//! Three panels side by side:
//! 1. Blocks: the template catalog
//! 2. Strategy: the ordered block sequence being edited
//! 3. Findings: live validation results
//!
//! Saves run on a background worker so the editor never blocks on the network.

pub mod app;
pub mod input;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::AppState;
pub use theme::Theme;
