use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use engine::{Money, TransactionKind};

use crate::{
    app::{AppState, totals::CategoryTotal},
    ui::{
        components::{card::Card, centered_rect, money::styled_kind_amount},
        theme::Theme,
    },
};

const UNCATEGORIZED: &str = "Uncategorized";

/// Month report: expense and income totals per category.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let title = format!("Report of {}", state.scope.label());
    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);
    let card = Card::new(&title, theme).focused(true);
    let inner = card.inner(popup);
    frame.render_widget(card.block(), popup);

    let Some(report) = state.totals.report(state.scope) else {
        let loading = Paragraph::new(Span::styled("Loading…", Style::default().fg(theme.dim)));
        frame.render_widget(loading, inner);
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let sections = [
        (TransactionKind::Expense, "Expenses", &report.expenses, report.totals.expenses),
        (TransactionKind::Income, "Income", &report.income, report.totals.income),
    ];
    for (area, (kind, heading, lines, whole)) in cols.iter().zip(sections) {
        let paragraph = Paragraph::new(section(state, kind, heading, lines, whole, theme));
        frame.render_widget(paragraph, *area);
    }
}

fn section<'a>(
    state: &'a AppState,
    kind: TransactionKind,
    heading: &'a str,
    lines: &'a [CategoryTotal],
    whole: Money,
    theme: &Theme,
) -> Vec<Line<'a>> {
    let mut out = vec![
        Line::from(vec![
            Span::styled(heading, Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            styled_kind_amount(whole, kind, state.currency, theme),
        ]),
        Line::default(),
    ];

    if lines.is_empty() {
        out.push(Line::from(Span::styled(
            "Nothing this month.",
            Style::default().fg(theme.dim),
        )));
        return out;
    }

    out.extend(lines.iter().map(|line| {
        let category = line.category.as_deref();
        Line::from(vec![
            Span::raw(format!("{} ", state.icons.icon_for(category))),
            Span::styled(category.unwrap_or(UNCATEGORIZED), Style::default().fg(theme.text)),
            Span::raw("  "),
            styled_kind_amount(line.total, kind, state.currency, theme),
            Span::styled(
                format!("  {}%", line.percent_of(whole)),
                Style::default().fg(theme.dim),
            ),
        ])
    }));
    out
}
