use ratatui::{style::Style, text::Span};

use crate::ui::{keymap::KeyContext, theme::Theme};

/// A key and the action it triggers.
#[derive(Debug, Clone, Copy)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

const DASHBOARD: &[KeyHint] = &[
    KeyHint::new("[ ]", "month"),
    KeyHint::new("e", "expenses"),
    KeyHint::new("i", "income"),
    KeyHint::new("a", "add expense"),
    KeyHint::new("n", "new income"),
    KeyHint::new("r", "recurring"),
    KeyHint::new("p", "report"),
    KeyHint::new("q", "quit"),
];

const LIST: &[KeyHint] = &[
    KeyHint::new("↑↓", "select"),
    KeyHint::new("d", "delete"),
    KeyHint::new("Esc", "close"),
];

const REPORT: &[KeyHint] = &[KeyHint::new("Esc", "close")];

const TEXT_INPUT: &[KeyHint] = &[KeyHint::new("Enter", "save"), KeyHint::new("Esc", "cancel")];

pub fn for_context(context: KeyContext) -> &'static [KeyHint] {
    match context {
        KeyContext::Dashboard => DASHBOARD,
        KeyContext::List => LIST,
        KeyContext::Report => REPORT,
        KeyContext::TextInput => TEXT_INPUT,
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }
    spans
}
