//! Money and rounding helpers.
//!
//! All monetary arithmetic uses [`Decimal`]; amounts cross every boundary as
//! fixed 2-decimal strings, never as floats.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Currency symbol used for display formatting.
const CURRENCY_SYMBOL: &str = "$";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("value is not a valid decimal amount: {0:?}")]
    InvalidArgument(String),
}

/// Rounds to 2 decimal places, half-up (midpoint away from zero).
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a decimal amount from a string.
///
/// # Errors
///
/// Returns [`MoneyError::InvalidArgument`] when the input is not a numeric
/// string.
pub fn parse_amount(raw: &str) -> Result<Decimal, MoneyError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| MoneyError::InvalidArgument(raw.to_string()))
}

/// Renders an amount as a fixed 2-decimal string without a currency symbol.
///
/// This is the canonical persistence and interface representation.
#[must_use]
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// Renders an amount for display with a currency symbol.
///
/// `None` renders the literal `"NaN"` sentinel. This only ever feeds
/// presentation; stored amounts are always valid decimals.
#[must_use]
pub fn format_currency(value: Option<Decimal>) -> String {
    match value {
        Some(amount) => format!("{CURRENCY_SYMBOL}{}", format_amount(amount)),
        None => "NaN".to_string(),
    }
}

/// Applies a percentage discount to a list price and rounds like cart totals.
#[must_use]
pub fn percent_off(list_price: Decimal, percentage: Decimal) -> Decimal {
    let factor = Decimal::ONE - percentage / Decimal::ONE_HUNDRED;

    round2(list_price * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn round2_half_up() {
        assert_eq!(round2(dec("2.005")), dec("2.01"));
        assert_eq!(round2(dec("2.004")), dec("2.00"));
        assert_eq!(round2(dec("2.675")), dec("2.68"));
    }

    #[test]
    fn round2_leaves_two_decimal_values_unchanged() {
        assert_eq!(round2(dec("38.75")), dec("38.75"));
    }

    #[test]
    fn parse_amount_accepts_numeric_strings() {
        assert_eq!(parse_amount("25.00"), Ok(dec("25")));
        assert_eq!(parse_amount(" 10.5 "), Ok(dec("10.5")));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert!(matches!(
            parse_amount("not-a-number"),
            Err(MoneyError::InvalidArgument(_))
        ));
        assert!(matches!(parse_amount(""), Err(MoneyError::InvalidArgument(_))));
    }

    #[test]
    fn format_amount_is_fixed_two_decimals() {
        assert_eq!(format_amount(dec("10")), "10.00");
        assert_eq!(format_amount(dec("3.7")), "3.70");
        assert_eq!(format_amount(dec("3.756")), "3.76");
    }

    #[test]
    fn format_currency_renders_symbol() {
        assert_eq!(format_currency(Some(dec("12"))), "$12.00");
    }

    #[test]
    fn format_currency_none_renders_nan_sentinel() {
        assert_eq!(format_currency(None), "NaN");
    }

    #[test]
    fn percent_off_discounts_and_rounds() {
        assert_eq!(percent_off(dec("100.00"), dec("25")), dec("75.00"));
        assert_eq!(percent_off(dec("9.99"), dec("10")), dec("8.99"));
        assert_eq!(percent_off(dec("50.00"), dec("0")), dec("50.00"));
        assert_eq!(percent_off(dec("50.00"), dec("100")), dec("0.00"));
    }
}
