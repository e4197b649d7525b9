use crate::{Money, Transaction, VisibilityState};

/// One rendered row of a list view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Row<'a> {
    pub transaction: &'a Transaction,
    /// Drives the removal transition styling.
    pub is_animating: bool,
    /// The row shows the in-flight spinner.
    pub is_pending: bool,
    /// Imported rows and rows already being removed keep a disabled delete
    /// control.
    pub deletable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection<'a> {
    pub rows: Vec<Row<'a>>,
    /// Sum of the rendered rows, animating ones included.
    pub total: Money,
}

impl Projection<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Project a snapshot through the visibility overlay.
///
/// Hidden rows are dropped; the total is computed over what remains so the
/// footer always agrees with the rendered rows.
pub fn project<'a>(snapshot: &'a [Transaction], visibility: &VisibilityState) -> Projection<'a> {
    let rows: Vec<Row<'a>> = snapshot
        .iter()
        .filter(|tx| !visibility.is_hidden(tx.id))
        .map(|tx| Row {
            transaction: tx,
            is_animating: visibility.is_animating(tx.id),
            is_pending: visibility.is_pending(tx.id),
            deletable: tx.is_mutable() && !visibility.is_animating(tx.id),
        })
        .collect();

    let total = rows.iter().map(|row| row.transaction.amount).sum();

    Projection { rows, total }
}
