//! `m  Markers   ON` style line for a keyboard-driven toggle.

use ratatui::text::{Line, Span};

use crate::theme;

pub fn toggle_line(key: char, label: &str, on: bool) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {key} "), theme::key_hint_key()),
        Span::styled(format!("{label:<10}"), theme::text()),
        Span::styled(if on { "ON" } else { "off" }, theme::toggle(on)),
    ])
}
