use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::Account;
use crate::report;
use crate::store::AccountStore;

/// Business rejections are expected control-flow outcomes, not faults. Every
/// operation guarantees zero side effects when it returns one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("invalid credentials")]
    BadCredentials,
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("no such account")]
    UnknownAccount,
    #[error("unknown recipient")]
    UnknownRecipient,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("cannot transfer to the same account")]
    SelfTransfer,
    #[error("no qualifying deposit on record")]
    NoQualifyingDeposit,
}

/// The ledger engine. Stateless aside from the store it wraps: the current
/// account is session context the caller holds and passes back in, and every
/// operation takes its own `at` timestamp.
pub struct Bank {
    store: AccountStore,
}

impl Bank {
    pub fn new(store: AccountStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Succeeds only if the account exists and the pin matches exactly. Both
    /// miss modes answer the same `BadCredentials`; callers are not told
    /// whether the username or the pin was wrong.
    pub fn authenticate(&self, username: &str, pin: u32) -> Result<&Account, Rejection> {
        self.store
            .find_by_username(username)
            .filter(|account| account.pin == pin)
            .ok_or(Rejection::BadCredentials)
    }

    /// Moves `amount` between two accounts as one atomic step: every
    /// precondition is checked before either ledger is touched, so a
    /// rejection leaves both untouched and a success debits and credits with
    /// the same timestamp.
    pub fn transfer(
        &mut self,
        from: &str,
        to: &str,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        if amount <= Decimal::ZERO {
            return Err(Rejection::NonPositiveAmount);
        }
        let source = self
            .store
            .find_by_username(from)
            .ok_or(Rejection::UnknownAccount)?;
        if self.store.find_by_username(to).is_none() {
            return Err(Rejection::UnknownRecipient);
        }
        // Balance is recomputed fresh at the moment of the check.
        if report::balance(source) < amount {
            return Err(Rejection::InsufficientFunds);
        }

        // Both ends exist, so pair_mut can only refuse the self-transfer case.
        let Some((source, recipient)) = self.store.pair_mut(from, to) else {
            return Err(Rejection::SelfTransfer);
        };
        source.push_movement(-amount, at);
        recipient.push_movement(amount, at);
        Ok(())
    }

    /// Grants a loan of the requested amount rounded up to the next whole
    /// unit, provided some existing movement is at least 10% of it. Returns
    /// the granted amount.
    pub fn request_loan(
        &mut self,
        username: &str,
        requested: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Decimal, Rejection> {
        let granted = requested.ceil();
        if granted <= Decimal::ZERO {
            return Err(Rejection::NonPositiveAmount);
        }

        let account = self
            .store
            .find_by_username_mut(username)
            .ok_or(Rejection::UnknownAccount)?;

        let threshold = granted * Decimal::new(1, 1);
        if !account.movements.iter().any(|m| m.amount >= threshold) {
            return Err(Rejection::NoQualifyingDeposit);
        }

        account.push_movement(granted, at);
        Ok(granted)
    }

    /// Removes the account, history and all, after the holder retypes their
    /// own username and pin. The caller's session reference becomes stale and
    /// is the caller's to clear.
    pub fn close_account(
        &mut self,
        username: &str,
        confirm_username: &str,
        confirm_pin: u32,
    ) -> Result<(), Rejection> {
        let account = self
            .store
            .find_by_username(username)
            .ok_or(Rejection::UnknownAccount)?;
        if confirm_username != account.username || confirm_pin != account.pin {
            return Err(Rejection::BadCredentials);
        }
        self.store.remove_by_username(username);
        Ok(())
    }
}
