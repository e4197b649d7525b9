use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph},
};

use engine::{Origin, RowIcon, TransactionKind, resolve_icon};

use crate::{
    app::{AppState, ListModal},
    ui::{
        components::{
            card::Card,
            centered_rect,
            money::styled_kind_amount,
        },
        theme::Theme,
    },
};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];
const IMPORTED_HINT: &str = "Imported from Open Finance";
const DELETE_ENABLED: &str = "  [d]";
const DELETE_DISABLED: &str = "  [-]";

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, modal: ListModal, theme: &Theme) {
    let view = state.view(modal.kind);
    let projection = view.projection();
    let title = format!("{} of {}", heading(modal.kind), state.scope.label());

    let popup = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup);
    let card = Card::new(&title, theme).focused(true);
    let inner = card.inner(popup);
    frame.render_widget(card.block(), popup);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Count and spinner
            Constraint::Min(1),    // Rows
            Constraint::Length(1), // Footer total
        ])
        .split(inner);

    let mut summary = vec![Span::styled(
        format!("{} entries found", projection.len()),
        Style::default().fg(theme.dim),
    )];
    if view.is_animating() {
        summary.push(Span::styled(
            format!("  {} deleting…", SPINNER[state.tick % SPINNER.len()]),
            Style::default().fg(theme.warning),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(summary)), layout[0]);

    if projection.is_empty() {
        let empty = Paragraph::new(Span::styled(
            format!("No {} registered this month.", noun(modal.kind)),
            Style::default().fg(theme.dim),
        ));
        frame.render_widget(empty, layout[1]);
        return;
    }

    let items: Vec<ListItem<'_>> = projection
        .rows
        .iter()
        .map(|row| {
            let tx = row.transaction;
            let icon = resolve_icon(tx, &state.icons, &state.banks);
            let name = tx.description.clone().unwrap_or_else(|| match tx.kind {
                TransactionKind::Expense => "Expense".to_string(),
                TransactionKind::Income => "Income".to_string(),
            });
            let date = tx
                .occurred_on
                .map(|d| d.format("%d/%m").to_string())
                .unwrap_or_else(|| "--/--".to_string());

            let mut spans = vec![
                Span::raw(format!("{} ", icon.glyph())),
                Span::raw(name),
                Span::styled(format!("  {date}"), Style::default().fg(theme.dim)),
            ];
            if let Some(category) = &tx.category {
                spans.push(Span::styled(
                    format!("  {category}"),
                    Style::default().fg(theme.dim),
                ));
            }
            if tx.recurring {
                spans.push(Span::styled("  ↻ recurring", Style::default().fg(theme.accent)));
            }
            if tx.origin == Origin::Imported {
                let hint = match icon {
                    RowIcon::Bank(bank) => format!("  {IMPORTED_HINT} · {}", bank.name),
                    RowIcon::Category(_) | RowIcon::UnknownBank => format!("  {IMPORTED_HINT}"),
                };
                spans.push(Span::styled(hint, Style::default().fg(theme.dim)));
            }
            spans.push(Span::raw("  "));
            spans.push(styled_kind_amount(tx.amount, tx.kind, state.currency, theme));
            if row.is_pending {
                spans.push(Span::styled(
                    format!(" {}", SPINNER[state.tick % SPINNER.len()]),
                    Style::default().fg(theme.warning),
                ));
            }

            spans.push(delete_control(row.deletable, theme));

            let line = Line::from(spans);
            let line = if row.is_animating {
                line.style(
                    Style::default()
                        .fg(theme.dim)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                line
            };
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.border).add_modifier(Modifier::BOLD))
        .highlight_symbol("› ");
    let mut list_state = ListState::default().with_selected(Some(modal.selected));
    frame.render_stateful_widget(list, layout[1], &mut list_state);

    let footer = Line::from(vec![
        Span::styled("Month total: ", Style::default().fg(theme.dim)),
        styled_kind_amount(projection.total, modal.kind, state.currency, theme)
            .patch_style(Style::default().add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(footer).right_aligned(), layout[2]);
}

/// Imported rows and rows already being removed get a greyed control.
fn delete_control(deletable: bool, theme: &Theme) -> Span<'static> {
    if deletable {
        Span::styled(DELETE_ENABLED, Style::default().fg(theme.negative))
    } else {
        Span::styled(DELETE_DISABLED, Style::default().fg(theme.dim))
    }
}

fn heading(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "Expenses",
        TransactionKind::Income => "Income",
    }
}

fn noun(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "expenses",
        TransactionKind::Income => "income",
    }
}
