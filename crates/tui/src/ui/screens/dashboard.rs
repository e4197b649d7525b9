use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use engine::TransactionKind;

use crate::{
    app::AppState,
    ui::{
        components::{
            card::{Card, StatCard},
            money::{styled_amount_bold, styled_kind_amount},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Monthly totals
            Constraint::Min(4),    // Quick actions
        ])
        .split(area);

    render_totals(frame, layout[0], state, theme);
    render_actions(frame, layout[1], theme);
}

fn render_totals(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let card = Card::new("Monthly Totals", theme);
    let inner = card.inner(area);
    frame.render_widget(card.block(), area);

    let Some(totals) = state.totals.get(state.scope) else {
        let loading = Paragraph::new(Span::styled("Loading…", Style::default().fg(theme.dim)));
        frame.render_widget(loading, inner);
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(inner);

    let currency = state.currency;
    StatCard::new(
        "Expenses",
        styled_kind_amount(totals.expenses, TransactionKind::Expense, currency, theme),
        theme,
    )
    .render(frame, cols[0]);
    StatCard::new(
        "Income",
        styled_kind_amount(totals.income, TransactionKind::Income, currency, theme),
        theme,
    )
    .render(frame, cols[1]);
    StatCard::new(
        "Balance",
        styled_amount_bold(totals.balance(), currency, theme),
        theme,
    )
    .render(frame, cols[2]);
}

fn render_actions(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(theme.accent));
    let lines = vec![
        Line::from(vec![
            key("e"),
            Span::raw(" Expenses of the month   "),
            key("i"),
            Span::raw(" Income of the month   "),
            key("p"),
            Span::raw(" Report"),
        ]),
        Line::from(vec![
            key("a"),
            Span::raw(" Add expense   "),
            key("n"),
            Span::raw(" New income   "),
            key("r"),
            Span::raw(" Recurring expense"),
        ]),
    ];
    Card::new("Quick actions", theme).render_with(frame, area, Paragraph::new(lines));
}
