use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::format::{Currency, Locale};

/// One signed ledger entry. Positive amounts are deposits/incoming, negative
/// amounts are withdrawals/outgoing transfers. Insertion order is the
/// canonical ledger order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub amount: Decimal,
    pub booked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Full display name.
    pub owner: String,
    /// Lowercase initials of `owner`, computed once at admission. There is no
    /// rename operation, so the two stay consistent for the account lifetime.
    pub username: String,
    pub pin: u32,
    /// Percentage applied to qualifying deposits (1.2 means 1.2%).
    pub interest_rate: Decimal,
    /// Append-only; entries are never edited or removed individually.
    pub movements: Vec<Movement>,
    pub currency: Currency,
    pub locale: Locale,
}

impl Account {
    pub fn push_movement(&mut self, amount: Decimal, booked_at: DateTime<Utc>) {
        self.movements.push(Movement { amount, booked_at });
    }

    pub fn first_name(&self) -> &str {
        self.owner.split_whitespace().next().unwrap_or(&self.owner)
    }
}

/// Derives the stable login identifier from a display name: the lowercase
/// first letter of each whitespace-separated token ("Jonas Schmedtmann" →
/// "js").
pub fn derive_username(owner: &str) -> String {
    owner
        .split_whitespace()
        .filter_map(|token| token.chars().next())
        .flat_map(|initial| initial.to_lowercase())
        .collect()
}
