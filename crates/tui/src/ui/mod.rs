pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::AppState;

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Dashboard
            Constraint::Length(1), // Hints
        ])
        .split(area);

    render_header(frame, layout[0], state, &theme);
    screens::dashboard::render(frame, layout[1], state, &theme);
    render_hints(frame, layout[2], state, &theme);

    if state.report_open {
        screens::report::render(frame, layout[1], state, &theme);
    }
    if let Some(modal) = state.modal {
        screens::list_modal::render(frame, layout[1], state, modal, &theme);
    }
    if let Some(form) = &state.quick_add {
        screens::quick_add::render(frame, layout[1], form, &theme);
    }
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            "Moneta",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ‹ ", Style::default().fg(theme.dim)),
        Span::styled(state.scope.label(), Style::default().fg(theme.text)),
        Span::styled(" ›  ", Style::default().fg(theme.dim)),
        Span::styled(state.currency.code(), Style::default().fg(theme.dim)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_hints(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let hints = components::hints::for_context(state.key_context());
    let spans = components::hints::hints_to_spans(hints, theme);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
