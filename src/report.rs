use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::Account;

/// Signed sum of all movements. Pure; callers decide whether to cache.
pub fn balance(account: &Account) -> Decimal {
    account.movements.iter().map(|m| m.amount).sum()
}

pub fn total_income(account: &Account) -> Decimal {
    account
        .movements
        .iter()
        .map(|m| m.amount)
        .filter(|amount| *amount > Decimal::ZERO)
        .sum()
}

pub fn total_expense(account: &Account) -> Decimal {
    let spent: Decimal = account
        .movements
        .iter()
        .map(|m| m.amount)
        .filter(|amount| *amount < Decimal::ZERO)
        .sum();
    spent.abs()
}

/// Interest earned per deposit at the account rate, keeping only amounts of
/// at least one whole unit. Tiny interest amounts are not paid out.
pub fn qualifying_interest(account: &Account) -> Decimal {
    account
        .movements
        .iter()
        .filter(|m| m.amount > Decimal::ZERO)
        .map(|m| m.amount * account.interest_rate / Decimal::ONE_HUNDRED)
        .filter(|earned| *earned >= Decimal::ONE)
        .sum()
}

/// One display row: `seq` is the 1-based insertion position and survives
/// sorting unchanged. Sorting only reorders which row shows where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementRow {
    pub seq: usize,
    pub amount: Decimal,
    pub booked_at: DateTime<Utc>,
}

/// Rows in insertion order, or stably sorted ascending by amount. Operates on
/// a copy; the account's ledger order is never touched.
pub fn ordered_movements(account: &Account, ascending: bool) -> Vec<MovementRow> {
    let mut rows: Vec<MovementRow> = account
        .movements
        .iter()
        .enumerate()
        .map(|(i, m)| MovementRow {
            seq: i + 1,
            amount: m.amount,
            booked_at: m.booked_at,
        })
        .collect();

    if ascending {
        rows.sort_by(|a, b| a.amount.cmp(&b.amount));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Movement, derive_username};
    use crate::format::{Currency, Locale};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn account_with(rate: Decimal, amounts: &[Decimal]) -> Account {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let owner = "Test Holder";
        Account {
            owner: owner.to_string(),
            username: derive_username(owner),
            pin: 1234,
            interest_rate: rate,
            movements: amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| Movement {
                    amount: *amount,
                    booked_at: t0 + chrono::Duration::days(i as i64),
                })
                .collect(),
            currency: Currency::Eur,
            locale: Locale::PtPt,
        }
    }

    #[test]
    fn balance_is_the_signed_sum() {
        let acc = account_with(dec!(1.0), &[dec!(200), dec!(-100), dec!(50.5)]);
        assert_eq!(balance(&acc), dec!(150.5));
        assert_eq!(balance(&account_with(dec!(1.0), &[])), Decimal::ZERO);
    }

    #[test]
    fn income_minus_expense_equals_balance() {
        let acc = account_with(
            dec!(1.2),
            &[
                dec!(200),
                dec!(455.23),
                dec!(-306.5),
                dec!(25000),
                dec!(-642.21),
                dec!(-133.9),
                dec!(79.97),
                dec!(1300),
            ],
        );
        assert_eq!(total_income(&acc), dec!(27035.20));
        assert_eq!(total_expense(&acc), dec!(1082.61));
        assert_eq!(total_income(&acc) - total_expense(&acc), balance(&acc));
    }

    #[test]
    fn interest_below_one_unit_is_not_paid_out() {
        // 200 earns 2.4 and is kept; the withdrawal contributes nothing.
        let acc = account_with(dec!(1.2), &[dec!(200), dec!(-100)]);
        assert_eq!(qualifying_interest(&acc), dec!(2.4));

        // 79.97 earns 0.95964, under the one-unit floor.
        let acc = account_with(dec!(1.2), &[dec!(79.97)]);
        assert_eq!(qualifying_interest(&acc), Decimal::ZERO);
    }

    #[test]
    fn sorted_rows_keep_insertion_seq_and_are_stable_on_ties() {
        let acc = account_with(dec!(1.0), &[dec!(30), dec!(10), dec!(30), dec!(-5)]);

        let unsorted = ordered_movements(&acc, false);
        assert_eq!(
            unsorted.iter().map(|r| r.seq).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );

        let sorted = ordered_movements(&acc, true);
        assert_eq!(
            sorted.iter().map(|r| r.amount).collect::<Vec<_>>(),
            vec![dec!(-5), dec!(10), dec!(30), dec!(30)]
        );
        // The two 30s keep their relative order: seq 1 before seq 3.
        assert_eq!(
            sorted.iter().map(|r| r.seq).collect::<Vec<_>>(),
            vec![4, 2, 1, 3]
        );

        // Same multiset either way, and the account itself is untouched.
        let mut resorted: Vec<_> = unsorted.iter().map(|r| r.amount).collect();
        resorted.sort();
        assert_eq!(
            resorted,
            sorted.iter().map(|r| r.amount).collect::<Vec<_>>()
        );
        assert_eq!(
            acc.movements.iter().map(|m| m.amount).collect::<Vec<_>>(),
            vec![dec!(30), dec!(10), dec!(30), dec!(-5)]
        );
    }
}
