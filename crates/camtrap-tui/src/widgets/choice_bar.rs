//! Inline single-choice selector, e.g. the base-layer picker.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use crate::theme;

/// One line listing every option, the active one bracketed and highlighted.
pub fn choice_bar<'a>(labels: &[&'a str], active_index: usize) -> Line<'a> {
    let mut spans = Vec::with_capacity(labels.len() * 2);

    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" ", theme::key_hint()));
        }
        if i == active_index {
            spans.push(Span::styled(
                format!("[{label}]"),
                theme::tab_active().add_modifier(Modifier::UNDERLINED),
            ));
        } else {
            spans.push(Span::styled(*label, theme::tab_inactive()));
        }
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_option_is_bracketed() {
        let line = choice_bar(&["Standard", "Topographical", "Satellite"], 1);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Standard [Topographical] Satellite");
    }
}
