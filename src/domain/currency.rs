//! Accounting-style money formatting.

pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// `symbol` followed by the amount to two decimals. Negative amounts are shown
/// in parentheses instead of with a minus sign: `-1234.5` becomes `$(1234.50)`.
/// Anything that rounds to zero is shown unsigned.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let magnitude = format!("{:.2}", amount.abs());
    if amount < 0.0 && magnitude != "0.00" {
        format!("{symbol}({magnitude})")
    } else {
        format!("{symbol}{magnitude}")
    }
}
