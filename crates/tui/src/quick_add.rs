use chrono::NaiveDate;
use engine::{Currency, Money, NewTransaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAddKind {
    Expense,
    Income,
    RecurringExpense,
}

impl QuickAddKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Expense => "Add expense",
            Self::Income => "New income",
            Self::RecurringExpense => "Recurring expense",
        }
    }

    fn transaction_kind(self) -> TransactionKind {
        match self {
            Self::Expense | Self::RecurringExpense => TransactionKind::Expense,
            Self::Income => TransactionKind::Income,
        }
    }
}

/// Parse `amount [#category] [description]` into a create request.
pub fn parse(
    input: &str,
    kind: QuickAddKind,
    currency: Currency,
    occurred_on: NaiveDate,
) -> Result<NewTransaction, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Enter an amount.".to_string());
    }

    let (amount_raw, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));

    let amount = Money::parse_major(amount_raw, currency)
        .map_err(|_| "Invalid amount.".to_string())?
        .abs();
    if amount.is_zero() {
        return Err("Amount must be > 0.".to_string());
    }

    let (category, description) = parse_tag(rest.trim())?;

    Ok(NewTransaction {
        kind: kind.transaction_kind(),
        amount,
        category,
        description,
        occurred_on,
        recurring: kind == QuickAddKind::RecurringExpense,
    })
}

fn parse_tag(raw: &str) -> Result<(Option<String>, Option<String>), String> {
    if raw.is_empty() {
        return Ok((None, None));
    }

    let mut tag: Option<String> = None;
    let mut kept: Vec<&str> = Vec::new();

    for token in raw.split_whitespace() {
        match token.strip_prefix('#') {
            Some(rest) if !rest.is_empty() => {
                if tag.is_some() {
                    return Err("Too many categories: at most 1.".to_string());
                }
                tag = Some(rest.to_string());
            }
            _ => kept.push(token),
        }
    }

    let description = kept.join(" ");
    let description = if description.is_empty() {
        None
    } else {
        Some(description)
    };
    Ok((tag, description))
}
