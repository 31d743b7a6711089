//! Money helpers
//!
//! Amounts are always `Decimal`. Display strings use a leading "$" and exactly
//! two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

use super::result::{Error, Result};

/// Stored amounts are DECIMAL(10,2): everything must stay below 10^8
pub const AMOUNT_LIMIT: i64 = 100_000_000;

/// Format an amount for display, e.g. `$9.15`
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${:.2}", rounded)
}

/// Parse a user-supplied amount leniently
///
/// Accepts "$12.99", "1,024.00", " 9.15 ". Returns None for empty or
/// unparseable input.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse().ok()
}

/// Reject amounts the store cannot hold: negatives, and anything that
/// reaches `AMOUNT_LIMIT` once rounded to cents
pub fn check_amount(label: &str, amount: Decimal) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::validation(format!("{} cannot be negative", label)));
    }
    let cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if cents >= Decimal::from(AMOUNT_LIMIT) {
        return Err(Error::validation(format!(
            "{} {} is too large (limit {})",
            label,
            amount,
            format_usd(Decimal::from(AMOUNT_LIMIT) - Decimal::new(1, 2))
        )));
    }
    Ok(())
}

/// Price used for comparison: unknown counts as zero
pub fn price_or_zero(price: Option<Decimal>) -> Decimal {
    price.unwrap_or(Decimal::ZERO)
}
