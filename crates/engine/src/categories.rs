//! Row iconography: category icons and connected banks.
//!
//! Never used for correctness, only for display.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::Transaction;

pub const FALLBACK_ICON: &str = "💸";
pub const BANK_ICON: &str = "🏦";

const DEFAULT_ICONS: [(&str, &str); 7] = [
    ("Alimentação", "🍽️"),
    ("Transporte", "🚗"),
    ("Aluguel", "🏠"),
    ("Saúde", "⚕️"),
    ("Educação", "📚"),
    ("Lazer", "🎮"),
    ("Outros", "💸"),
];

/// Immutable category → icon table with a fallback for unknown categories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryIcons {
    icons: HashMap<String, String>,
    fallback: String,
}

impl Default for CategoryIcons {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_ICONS)
    }
}

impl CategoryIcons {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let icons = pairs
            .into_iter()
            .filter_map(|(name, icon)| normalize_key(name.as_ref()).map(|key| (key, icon.into())))
            .collect();
        Self {
            icons,
            fallback: FALLBACK_ICON.to_string(),
        }
    }

    /// Default table extended (or overridden) by `overrides`.
    #[must_use]
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, icon) in overrides {
            if let Some(key) = normalize_key(name) {
                self.icons.insert(key, icon.clone());
            }
        }
        self
    }

    /// Icon for `category`; total over all inputs.
    pub fn icon_for(&self, category: Option<&str>) -> &str {
        category
            .and_then(normalize_key)
            .and_then(|key| self.icons.get(&key))
            .map_or(self.fallback.as_str(), String::as_str)
    }
}

/// Lookup key: accents folded, lower-cased, punctuation collapsed to spaces.
fn normalize_key(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::new();
    let mut prev_space = false;
    for ch in trimmed.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConnection {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

/// Connected banks by bank-connection item id.
#[derive(Clone, Debug, Default)]
pub struct BankDirectory {
    connections: HashMap<String, BankConnection>,
}

impl BankDirectory {
    pub fn new(connections: Vec<BankConnection>) -> Self {
        Self {
            connections: connections
                .into_iter()
                .map(|conn| (conn.id.clone(), conn))
                .collect(),
        }
    }

    pub fn lookup(&self, item_id: &str) -> Option<&BankConnection> {
        self.connections.get(item_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowIcon<'a> {
    Category(&'a str),
    Bank(&'a BankConnection),
    UnknownBank,
}

impl RowIcon<'_> {
    /// Short textual glyph for terminals that cannot show bank logos.
    pub fn glyph(&self) -> &str {
        match self {
            Self::Category(icon) => icon,
            Self::Bank(_) | Self::UnknownBank => BANK_ICON,
        }
    }
}

/// Manual rows use the category icon, imported rows their bank.
pub fn resolve_icon<'a>(
    tx: &Transaction,
    icons: &'a CategoryIcons,
    banks: &'a BankDirectory,
) -> RowIcon<'a> {
    match tx.item_id.as_deref() {
        None => RowIcon::Category(icons.icon_for(tx.category.as_deref())),
        Some(item_id) => match banks.lookup(item_id) {
            Some(bank) => RowIcon::Bank(bank),
            None => {
                tracing::debug!(item_id, "no bank connection for item");
                RowIcon::UnknownBank
            }
        },
    }
}
