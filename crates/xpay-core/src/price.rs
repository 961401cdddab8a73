//! # Price Utilities
//!
//! Amounts are carried as integers in the smallest currency unit (cents).

/// Largest amount, in cents, the checkout will accept.
pub const MAX_AMOUNT: i64 = 999_999;

/// The only currency the provider is asked to charge in.
pub const CURRENCY: &str = "USD";

/// Format a cent amount for display, e.g. `4500` -> `"$45.00"`.
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("${}{}.{:02}", sign, abs / 100, abs % 100)
}

/// True iff `cents` is positive and not above [`MAX_AMOUNT`].
pub fn is_valid_amount(cents: i64) -> bool {
    cents > 0 && cents <= MAX_AMOUNT
}

/// Convert a whole-dollar amount, as shown on a buy button, to cents.
///
/// Returns `None` for non-integral, non-finite or out-of-range input.
pub fn cents_from_dollars(dollars: f64) -> Option<i64> {
    if !dollars.is_finite() || dollars.fract() != 0.0 {
        return None;
    }
    let cents = dollars * 100.0;
    if cents.abs() > i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}
