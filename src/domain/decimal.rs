//! Loss-free decimal-string arithmetic for wire-level amounts.
//!
//! Amounts may carry up to 18 significant fractional digits, past the exact
//! range of an IEEE-754 double, so every function here works on the decimal
//! digits as strings or on raw-unit `u128` integers. Binary floats never
//! appear on this path.

use crate::error::{MemolessError, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

/// True when `s` is a plain decimal number: digits with at most one point
/// and at least one digit somewhere.
pub fn is_decimal_string(s: &str) -> bool {
    let mut points = 0;
    let mut digits = 0;
    for c in s.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' if points == 0 => points = 1,
            _ => return false,
        }
    }
    digits > 0
}

/// Split into integer and fractional parts. A missing fractional part is the
/// empty string.
pub fn split_decimal(s: &str) -> (&str, &str) {
    match s.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (s, ""),
    }
}

/// Keep the first `n` fractional digits, silently dropping the rest. This
/// never rounds: rounding up could push the value past the reference digits
/// or past dust without the user's say-so.
pub fn truncate_fraction(fraction: &str, n: usize) -> &str {
    &fraction[..fraction.len().min(n)]
}

/// Right-pad with zeros to exactly `n` digits.
pub fn pad_fraction(fraction: &str, n: usize) -> String {
    let mut out = String::with_capacity(n);
    out.push_str(truncate_fraction(fraction, n));
    while out.len() < n {
        out.push('0');
    }
    out
}

/// Produce the raw (indivisible-unit) integer string for `s` at `decimals`
/// precision by concatenating the integer part with the padded fraction and
/// stripping leading zeros. String concatenation instead of multiplying by
/// `10^decimals` keeps 18-decimal assets exact.
pub fn shift_to_integer(s: &str, decimals: u32) -> Result<String> {
    if !is_decimal_string(s) {
        return Err(MemolessError::Input(format!("not a decimal number: {s}")));
    }
    let (int_part, frac_part) = split_decimal(s);
    let mut raw = String::with_capacity(int_part.len() + decimals as usize);
    raw.push_str(int_part);
    raw.push_str(&pad_fraction(frac_part, decimals as usize));
    let trimmed = raw.trim_start_matches('0');
    if trimmed.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Raw-unit value of `s` at `decimals` precision.
pub fn raw_value(s: &str, decimals: u32) -> Result<u128> {
    let raw = shift_to_integer(s, decimals)?;
    raw.parse::<u128>().map_err(|_| MemolessError::Overflow)
}

/// Inverse of [`shift_to_integer`]: re-insert the decimal point so the
/// result has exactly `decimals` fractional digits.
pub fn format_raw(raw: u128, decimals: u32) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }
    if digits.len() <= decimals {
        format!("0.{:0>width$}", digits, width = decimals)
    } else {
        let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
        format!("{int_part}.{frac_part}")
    }
}

/// Exact numeric parse for value comparisons. Equality and ordering of
/// decimal strings are defined by numeric value, not string value.
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s).map_err(|_| MemolessError::Input(format!("not a decimal number: {s}")))
}

/// Strictly positive numeric value check used as the first input gate.
pub fn is_strictly_positive(s: &str) -> bool {
    is_decimal_string(s)
        && parse_decimal(s)
            .map(|d| d > Decimal::ZERO)
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_split_decimal() {
        assert_eq!(split_decimal("123.456"), ("123", "456"));
        assert_eq!(split_decimal("123"), ("123", ""));
        assert_eq!(split_decimal("0.5"), ("0", "5"));
        assert_eq!(split_decimal(".5"), ("", "5"));
    }

    #[test]
    fn test_truncate_never_rounds() {
        assert_eq!(truncate_fraction("239", 2), "23");
        assert_eq!(truncate_fraction("999999", 3), "999");
        assert_eq!(truncate_fraction("12", 5), "12");
        assert_eq!(truncate_fraction("", 3), "");
    }

    #[test]
    fn test_pad_fraction() {
        assert_eq!(pad_fraction("12", 5), "12000");
        assert_eq!(pad_fraction("", 3), "000");
        assert_eq!(pad_fraction("123456", 4), "1234");
    }

    #[test]
    fn test_shift_to_integer() {
        assert_eq!(shift_to_integer("1.00000003", 8).unwrap(), "100000003");
        assert_eq!(shift_to_integer("0.00001", 8).unwrap(), "1000");
        assert_eq!(shift_to_integer("2", 8).unwrap(), "200000000");
        assert_eq!(shift_to_integer("0", 8).unwrap(), "0");
        assert_eq!(shift_to_integer("0.000000000000000001", 18).unwrap(), "1");
        assert!(shift_to_integer("abc", 8).is_err());
    }

    #[test]
    fn test_shift_is_exact_at_eighteen_decimals() {
        // 1.1 is not representable in binary; the string path keeps it exact.
        assert_eq!(
            shift_to_integer("1.100000000000000001", 18).unwrap(),
            "1100000000000000001"
        );
    }

    #[test]
    fn test_format_raw_roundtrip() {
        assert_eq!(format_raw(100000003, 8), "1.00000003");
        assert_eq!(format_raw(1000, 8), "0.00001000");
        assert_eq!(format_raw(5, 0), "5");
        assert_eq!(format_raw(0, 8), "0.00000000");
    }

    #[test]
    fn test_numeric_comparison_ignores_formatting() {
        assert_eq!(parse_decimal("1.50").unwrap(), dec!(1.5));
        assert!(parse_decimal("0.00002").unwrap() > parse_decimal("0.00001").unwrap());
    }

    #[test]
    fn test_strictly_positive() {
        assert!(is_strictly_positive("0.00000001"));
        assert!(!is_strictly_positive("0"));
        assert!(!is_strictly_positive("0.0"));
        assert!(!is_strictly_positive("-1"));
        assert!(!is_strictly_positive("abc"));
        assert!(!is_strictly_positive(""));
    }
}
