//! Formatting helpers for terminal output
//!
//! Brazilian conventions: `.` groups thousands and `,` separates decimals.

use itertools::Itertools;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format `value` with `places` decimals in Brazilian notation, no symbol.
///
/// # Examples
/// ```
/// use carteira::utils::format_decimal_br;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_decimal_br(dec!(1234567.891), 2), "1.234.567,89");
/// assert_eq!(format_decimal_br(dec!(-0.5), 0), "-1");
/// ```
pub fn format_decimal_br(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.*}", places as usize, rounded.abs());
    let (integer, fraction) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let digits: Vec<char> = integer.chars().collect();
    let grouped = digits
        .rchunks(3)
        .rev()
        .map(|chunk| chunk.iter().collect::<String>())
        .join(".");

    match fraction {
        Some(f) => format!("{}{},{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format as Brazilian Real: "R$ 1.234,56"
///
/// # Examples
/// ```
/// use carteira::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "R$ 1.234,56");
/// assert_eq!(format_currency(dec!(-500)), "R$ -500,00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format!("R$ {}", format_decimal_br(value, 2))
}

/// Format a percent value: "12,68%"
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_decimal_br(value, 2))
}

/// Percent or "N/A" when it cannot be computed
pub fn format_optional_percent(value: Option<Decimal>) -> String {
    value
        .map(format_percent)
        .unwrap_or_else(|| "N/A".to_string())
}

/// Decimal as a plain string with `places` decimals, for JSON payloads
pub fn decimal_string(value: Decimal, places: u32) -> String {
    value
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_basic() {
        assert_eq!(format_currency(dec!(1234.56)), "R$ 1.234,56");
        assert_eq!(format_currency(dec!(0.99)), "R$ 0,99");
        assert_eq!(format_currency(dec!(1000000)), "R$ 1.000.000,00");
    }

    #[test]
    fn test_format_currency_small_values() {
        assert_eq!(format_currency(dec!(0)), "R$ 0,00");
        assert_eq!(format_currency(dec!(0.01)), "R$ 0,01");
        assert_eq!(format_currency(dec!(123)), "R$ 123,00");
        assert_eq!(format_currency(dec!(999.99)), "R$ 999,99");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(dec!(-1234.56)), "R$ -1.234,56");
        assert_eq!(format_currency(dec!(-0.01)), "R$ -0,01");
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(format_currency(dec!(1.005)), "R$ 1,01");
        assert_eq!(format_currency(dec!(1.004)), "R$ 1,00");
        assert_eq!(format_currency(dec!(-2.675)), "R$ -2,68");
    }

    #[test]
    fn test_negative_that_rounds_to_zero_has_no_sign() {
        assert_eq!(format_currency(dec!(-0.001)), "R$ 0,00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(12.682503)), "12,68%");
        assert_eq!(format_percent(dec!(-3.5)), "-3,50%");
        assert_eq!(format_optional_percent(None), "N/A");
        assert_eq!(format_optional_percent(Some(dec!(1))), "1,00%");
    }

    #[test]
    fn test_decimal_string_trims_zeros() {
        assert_eq!(decimal_string(dec!(1126.825030131969720661201), 2), "1126.83");
        assert_eq!(decimal_string(dec!(100.00), 2), "100");
        assert_eq!(decimal_string(dec!(0.5000), 4), "0.5");
    }
}
