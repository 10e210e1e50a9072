use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::{Account, Movement, derive_username};
use crate::format::{Currency, Locale};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("account '{owner}' has {movements} movements but {dates} movement dates")]
    MovementDateMismatch {
        owner: String,
        movements: usize,
        dates: usize,
    },
    #[error("accounts '{first}' and '{second}' both derive username '{username}'")]
    DuplicateUsername {
        first: String,
        second: String,
        username: String,
    },
}

/// On-disk shape of one seed account. Amounts and their timestamps travel as
/// parallel sequences; the pairing is validated when the account is admitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAccount {
    pub owner: String,
    pub pin: u32,
    pub interest_rate: Decimal,
    pub movements: Vec<Decimal>,
    pub movement_dates: Vec<DateTime<Utc>>,
    pub currency: Currency,
    pub locale: Locale,
}

impl SeedAccount {
    pub fn into_account(self) -> Result<Account, SeedError> {
        if self.movements.len() != self.movement_dates.len() {
            return Err(SeedError::MovementDateMismatch {
                movements: self.movements.len(),
                dates: self.movement_dates.len(),
                owner: self.owner,
            });
        }

        let username = derive_username(&self.owner);
        let movements = self
            .movements
            .into_iter()
            .zip(self.movement_dates)
            .map(|(amount, booked_at)| Movement { amount, booked_at })
            .collect();

        Ok(Account {
            owner: self.owner,
            username,
            pin: self.pin,
            interest_rate: self.interest_rate,
            movements,
            currency: self.currency,
            locale: self.locale,
        })
    }
}

/// The set of all accounts, looked up by derived username. Usernames are
/// unique; uniqueness is established here at construction time and engine
/// operations do not re-validate it.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: Vec<Account>,
}

impl AccountStore {
    pub fn from_seeds(seeds: Vec<SeedAccount>) -> Result<Self, SeedError> {
        let mut store = Self {
            accounts: Vec::with_capacity(seeds.len()),
        };
        for seed in seeds {
            let account = seed.into_account()?;
            if let Some(existing) = store.find_by_username(&account.username) {
                return Err(SeedError::DuplicateUsername {
                    first: existing.owner.clone(),
                    second: account.owner,
                    username: account.username,
                });
            }
            store.insert(account);
        }
        Ok(store)
    }

    /// Not-found is a normal outcome consumed by callers, not a fault.
    pub fn find_by_username(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|acc| acc.username == username)
    }

    pub fn find_by_username_mut(&mut self, username: &str) -> Option<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|acc| acc.username == username)
    }

    /// Deletes the matching account and its entire history; returns whether a
    /// match existed.
    pub fn remove_by_username(&mut self, username: &str) -> bool {
        match self.accounts.iter().position(|acc| acc.username == username) {
            Some(index) => {
                self.accounts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Caller is responsible for the username being pre-computed and
    /// collision-free (see `from_seeds`).
    pub fn insert(&mut self, account: Account) {
        self.accounts.push(account);
    }

    /// Disjoint mutable access to two distinct accounts. `None` when either
    /// username is missing or both name the same account.
    pub fn pair_mut(&mut self, a: &str, b: &str) -> Option<(&mut Account, &mut Account)> {
        let i = self.accounts.iter().position(|acc| acc.username == a)?;
        let j = self.accounts.iter().position(|acc| acc.username == b)?;
        if i == j {
            return None;
        }
        if i < j {
            let (left, right) = self.accounts.split_at_mut(j);
            Some((&mut left[i], &mut right[0]))
        } else {
            let (left, right) = self.accounts.split_at_mut(i);
            Some((&mut right[0], &mut left[j]))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Built-in demo seed: two accounts with a year of movement history.
const DEMO_SEED: &str = r#"[
  {
    "owner": "Jonas Schmedtmann",
    "pin": 1111,
    "interest_rate": "1.2",
    "movements": ["200", "455.23", "-306.5", "25000", "-642.21", "-133.9", "79.97", "1300"],
    "movement_dates": [
      "2019-11-18T21:31:17.178Z",
      "2019-12-23T07:42:02.383Z",
      "2020-01-28T09:15:04.904Z",
      "2020-04-01T10:17:24.185Z",
      "2020-05-08T14:11:59.604Z",
      "2020-05-27T17:01:17.194Z",
      "2020-07-11T23:36:17.929Z",
      "2020-07-12T10:51:36.790Z"
    ],
    "currency": "EUR",
    "locale": "pt-PT"
  },
  {
    "owner": "Jessica Davis",
    "pin": 2222,
    "interest_rate": "1.5",
    "movements": ["5000", "3400", "-150", "-790", "-3210", "-1000", "8500", "-30"],
    "movement_dates": [
      "2019-11-01T13:15:33.035Z",
      "2019-11-30T09:48:16.867Z",
      "2019-12-25T06:04:23.907Z",
      "2020-01-25T14:18:46.235Z",
      "2020-02-05T16:33:06.386Z",
      "2020-04-10T14:43:26.374Z",
      "2020-06-25T18:49:59.371Z",
      "2020-07-26T12:01:20.894Z"
    ],
    "currency": "USD",
    "locale": "en-US"
  }
]"#;

pub fn demo_seed() -> Result<Vec<SeedAccount>> {
    serde_json::from_str(DEMO_SEED).context("Built-in demo seed is not valid JSON")
}

pub fn load_seed_file(path: &Path) -> Result<Vec<SeedAccount>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read accounts file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse accounts file {}", path.display()))
}
