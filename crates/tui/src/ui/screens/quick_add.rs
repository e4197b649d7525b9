use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::{
    app::QuickAddForm,
    ui::{
        components::{card::Card, centered_rect},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, form: &QuickAddForm, theme: &Theme) {
    let popup = centered_rect(60, 30, area);
    let popup = Rect {
        height: popup.height.max(6),
        ..popup
    }
    .intersection(area);
    frame.render_widget(Clear, popup);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(theme.accent)),
            Span::raw(form.input.as_str()),
            Span::styled("▏", Style::default().fg(theme.accent)),
        ]),
        Line::from(Span::styled(
            "amount [#category] [description]",
            Style::default().fg(theme.dim),
        )),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(theme.error),
        )));
    }

    Card::new(form.kind.title(), theme)
        .focused(true)
        .render_with(frame, popup, Paragraph::new(lines));
}
