//! Savanna palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const LATERITE: Color = Color::Rgb(210, 105, 30); // #d2691e
pub const SAVANNA_GOLD: Color = Color::Rgb(232, 193, 95); // #e8c15f
pub const GALLERY_GREEN: Color = Color::Rgb(122, 184, 96); // #7ab860
pub const DRY_SEASON_SKY: Color = Color::Rgb(126, 200, 227); // #7ec8e3
pub const GAMBIA_BLUE: Color = Color::Rgb(70, 130, 200); // #4682c8
pub const ALERT_RED: Color = Color::Rgb(230, 80, 70); // #e65046

// ── Extended Palette ──────────────────────────────────────────────────

pub const BONE: Color = Color::Rgb(221, 214, 199); // #ddd6c7
pub const DUST: Color = Color::Rgb(138, 128, 112); // #8a8070
pub const BG_HIGHLIGHT: Color = Color::Rgb(52, 46, 38); // #342e26
pub const BG_DARK: Color = Color::Rgb(28, 25, 21); // #1c1915

/// One colour per weather chart, in panel order.
pub const CHART_SERIES: [Color; 4] = [LATERITE, GAMBIA_BLUE, SAVANNA_GOLD, DRY_SEASON_SKY];

// ── Map Styling ───────────────────────────────────────────────────────

pub const BOUNDARY: Color = DUST;
pub const MARKER: Color = GALLERY_GREEN;
pub const MARKER_SELECTED: Color = SAVANNA_GOLD;

// ── Semantic Styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(SAVANNA_GOLD).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(LATERITE)
}

pub fn border_default() -> Style {
    Style::default().fg(DUST)
}

pub fn text() -> Style {
    Style::default().fg(BONE)
}

pub fn muted() -> Style {
    Style::default().fg(DUST)
}

/// Highlighted row in the site list.
pub fn list_selected() -> Style {
    Style::default()
        .fg(SAVANNA_GOLD)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default().fg(LATERITE).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(BONE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(DUST)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(SAVANNA_GOLD).add_modifier(Modifier::BOLD)
}

/// ON/OFF badge for a visibility toggle.
pub fn toggle(on: bool) -> Style {
    if on {
        Style::default().fg(GALLERY_GREEN).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DUST)
    }
}
