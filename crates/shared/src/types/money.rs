//! Currency display and parsing for fund amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` end to end; this module only renders
//! and parses the human-facing text form.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Symbol printed in front of every amount.
pub const CURRENCY_SYMBOL: &str = "Rs.";

/// Errors produced when parsing an amount typed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    /// Input was empty after trimming.
    #[error("amount is empty")]
    Empty,

    /// Input is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
}

/// Renders amounts as `"<symbol> 1,234.56"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    symbol: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new(CURRENCY_SYMBOL)
    }
}

impl CurrencyFormat {
    /// Creates a formatter with the given currency symbol.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    /// Returns the configured symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Formats an amount with two decimals and thousands separators.
    ///
    /// Rounds with Banker's Rounding; negative amounts get a leading `-`.
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        format!("{sign}{} {}.{fraction}", self.symbol, group_thousands(whole))
    }
}

/// Formats an amount with the default `Rs.` symbol.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    CurrencyFormat::default().format(amount)
}

/// Parses a user-entered amount such as `"1,500.50"` or `"Rs. 200"`.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountParseError> {
    let trimmed = input.trim();
    let without_symbol = trimmed
        .strip_prefix(CURRENCY_SYMBOL)
        .unwrap_or(trimmed)
        .trim();
    if without_symbol.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let cleaned: String = without_symbol.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned).map_err(|_| AmountParseError::Invalid(input.to_string()))
}

fn group_thousands(whole: &str) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
