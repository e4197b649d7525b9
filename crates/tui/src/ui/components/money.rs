use engine::{Currency, Money, TransactionKind};
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Signed amount: green with `+` above zero, red below.
#[must_use]
pub fn styled_amount(amount: Money, currency: Currency, theme: &Theme) -> Span<'static> {
    let color = if amount > Money::ZERO {
        theme.positive
    } else if amount < Money::ZERO {
        theme.negative
    } else {
        theme.text
    };
    let prefix = if amount > Money::ZERO { "+" } else { "" };

    Span::styled(
        format!("{prefix}{}", amount.format(currency)),
        Style::default().fg(color),
    )
}

/// Unsigned amount colored by the kind of the row it belongs to.
#[must_use]
pub fn styled_kind_amount(
    amount: Money,
    kind: TransactionKind,
    currency: Currency,
    theme: &Theme,
) -> Span<'static> {
    let color = match kind {
        TransactionKind::Expense => theme.negative,
        TransactionKind::Income => theme.positive,
    };
    Span::styled(amount.abs().format(currency), Style::default().fg(color))
}

#[must_use]
pub fn styled_amount_bold(amount: Money, currency: Currency, theme: &Theme) -> Span<'static> {
    styled_amount(amount, currency, theme)
        .patch_style(Style::default().add_modifier(Modifier::BOLD))
}
