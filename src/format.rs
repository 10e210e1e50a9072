use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes known to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eur => "€",
            Self::Usd => "$",
            Self::Gbp => "£",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eur => write!(f, "EUR"),
            Self::Usd => write!(f, "USD"),
            Self::Gbp => write!(f, "GBP"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EUR" => Ok(Self::Eur),
            "USD" => Ok(Self::Usd),
            "GBP" => Ok(Self::Gbp),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// Display locales known to the ledger. Formatting conventions are looked up
/// per variant; business validation never reads the locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "pt-PT")]
    PtPt,
    #[serde(rename = "de-DE")]
    DeDe,
}

struct Conventions {
    group: char,
    decimal: char,
    symbol_first: bool,
    date_sep: char,
    month_first: bool,
}

impl Locale {
    fn conventions(self) -> Conventions {
        match self {
            Self::EnUs => Conventions {
                group: ',',
                decimal: '.',
                symbol_first: true,
                date_sep: '/',
                month_first: true,
            },
            Self::EnGb => Conventions {
                group: ',',
                decimal: '.',
                symbol_first: true,
                date_sep: '/',
                month_first: false,
            },
            Self::PtPt => Conventions {
                group: ' ',
                decimal: ',',
                symbol_first: false,
                date_sep: '/',
                month_first: false,
            },
            Self::DeDe => Conventions {
                group: '.',
                decimal: ',',
                symbol_first: false,
                date_sep: '.',
                month_first: false,
            },
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnUs => write!(f, "en-US"),
            Self::EnGb => write!(f, "en-GB"),
            Self::PtPt => write!(f, "pt-PT"),
            Self::DeDe => write!(f, "de-DE"),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en-us" => Ok(Self::EnUs),
            "en-gb" => Ok(Self::EnGb),
            "pt-pt" => Ok(Self::PtPt),
            "de-de" => Ok(Self::DeDe),
            _ => Err(format!("Unknown locale: {s}")),
        }
    }
}

/// Renders a monetary amount with the grouping, decimal separator and symbol
/// placement of `locale`, always with two decimal digits.
pub fn format_currency(amount: Decimal, locale: Locale, currency: Currency) -> String {
    let conv = locale.conventions();

    let cents = (amount.round_dp(2) * Decimal::ONE_HUNDRED)
        .to_i64()
        .unwrap_or(0);
    let negative = cents < 0;
    let cents = cents.abs();

    let mut number = group_digits(cents / 100, conv.group);
    number.push(conv.decimal);
    number.push_str(&format!("{:02}", cents % 100));

    let body = if conv.symbol_first {
        format!("{}{}", currency.symbol(), number)
    } else {
        format!("{} {}", number, currency.symbol())
    };

    if negative { format!("-{body}") } else { body }
}

fn group_digits(units: i64, separator: char) -> String {
    let digits = units.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Two-digit day/month plus year, ordered and separated per `locale`.
pub fn format_date(ts: DateTime<Utc>, locale: Locale) -> String {
    let conv = locale.conventions();
    if conv.month_first {
        format!(
            "{:02}{}{:02}{}{}",
            ts.month(),
            conv.date_sep,
            ts.day(),
            conv.date_sep,
            ts.year()
        )
    } else {
        format!(
            "{:02}{}{:02}{}{}",
            ts.day(),
            conv.date_sep,
            ts.month(),
            conv.date_sep,
            ts.year()
        )
    }
}

/// Relative label for recent timestamps, absolute locale date beyond a week.
///
/// Whole days are the rounded ratio of elapsed milliseconds to one day, so
/// 6.5 elapsed days reads as "7 days ago" while 7.6 falls through to the
/// absolute date.
pub fn format_relative_date(ts: DateTime<Utc>, now: DateTime<Utc>, locale: Locale) -> String {
    match whole_days_between(ts, now) {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n @ 2..=7 => format!("{n} days ago"),
        _ => format_date(ts, locale),
    }
}

fn whole_days_between(ts: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    const DAY_MS: f64 = 86_400_000.0;
    let elapsed_ms = (now - ts).num_milliseconds().abs();
    (elapsed_ms as f64 / DAY_MS).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_follows_locale_conventions() {
        assert_eq!(
            format_currency(dec!(1234.56), Locale::EnUs, Currency::Usd),
            "$1,234.56"
        );
        assert_eq!(
            format_currency(dec!(1234.56), Locale::PtPt, Currency::Eur),
            "1 234,56 €"
        );
        assert_eq!(
            format_currency(dec!(1234.56), Locale::DeDe, Currency::Eur),
            "1.234,56 €"
        );
        assert_eq!(
            format_currency(dec!(1234.56), Locale::EnGb, Currency::Gbp),
            "£1,234.56"
        );
    }

    #[test]
    fn currency_pads_to_two_decimals_and_groups_large_amounts() {
        assert_eq!(
            format_currency(dec!(25000), Locale::PtPt, Currency::Eur),
            "25 000,00 €"
        );
        assert_eq!(
            format_currency(dec!(0.5), Locale::EnUs, Currency::Usd),
            "$0.50"
        );
        assert_eq!(
            format_currency(dec!(1234567.8), Locale::EnUs, Currency::Usd),
            "$1,234,567.80"
        );
    }

    #[test]
    fn negative_amounts_carry_a_leading_sign() {
        assert_eq!(
            format_currency(dec!(-306.5), Locale::PtPt, Currency::Eur),
            "-306,50 €"
        );
        assert_eq!(
            format_currency(dec!(-100), Locale::EnUs, Currency::Usd),
            "-$100.00"
        );
    }

    #[test]
    fn relative_date_boundaries_match_the_policy_table() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let day = chrono::Duration::milliseconds(86_400_000);

        assert_eq!(format_relative_date(now, now, Locale::EnUs), "Today");
        assert_eq!(
            format_relative_date(now - day, now, Locale::EnUs),
            "Yesterday"
        );
        assert_eq!(
            format_relative_date(now - day * 2, now, Locale::EnUs),
            "2 days ago"
        );
        assert_eq!(
            format_relative_date(now - day * 7, now, Locale::EnUs),
            "7 days ago"
        );
        assert_eq!(
            format_relative_date(now - day * 8, now, Locale::EnUs),
            "07/30/2026"
        );
    }

    #[test]
    fn half_days_round_to_the_nearest_whole_day() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let half_day = chrono::Duration::milliseconds(43_200_000);

        // 6.5 days rounds to 7, still relative; 7.5 rounds to 8, absolute.
        assert_eq!(
            format_relative_date(now - half_day * 13, now, Locale::EnUs),
            "7 days ago"
        );
        assert_eq!(
            format_relative_date(now - half_day * 15, now, Locale::EnUs),
            "07/31/2026"
        );
    }

    #[test]
    fn dates_follow_locale_order_and_separator() {
        let ts = Utc.with_ymd_and_hms(2020, 7, 12, 10, 51, 36).unwrap();
        assert_eq!(format_date(ts, Locale::EnUs), "07/12/2020");
        assert_eq!(format_date(ts, Locale::EnGb), "12/07/2020");
        assert_eq!(format_date(ts, Locale::PtPt), "12/07/2020");
        assert_eq!(format_date(ts, Locale::DeDe), "12.07.2020");
    }
}
