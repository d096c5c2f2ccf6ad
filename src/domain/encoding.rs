//! Builds and checks deposit amounts that carry a reference ID in their
//! trailing decimal digits.

use crate::domain::decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Asset,
    Usd,
}

/// Result of one encoding pass. Pure value: recomputed on every keystroke,
/// replaced rather than mutated.
///
/// When valid, `final_amount` has exactly `asset_decimals` digits after the
/// point and its trailing `reference_id.len()` digits equal `reference_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountEncoding {
    pub raw_user_input: String,
    pub input_mode: InputMode,
    pub asset_decimals: u32,
    pub reference_id: String,
    pub final_amount: String,
    pub base_amount: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl AmountEncoding {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn rejected(
        user_input: &str,
        input_mode: InputMode,
        reference_id: &str,
        asset_decimals: u32,
        error: String,
    ) -> Self {
        Self {
            raw_user_input: user_input.to_string(),
            input_mode,
            asset_decimals,
            reference_id: reference_id.to_string(),
            final_amount: String::new(),
            base_amount: String::new(),
            warnings: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Encode `user_input` into a deposit amount whose trailing digits are
/// `reference_id`.
///
/// USD-mode input is converted with float division first; that conversion
/// only produces the preview base for the digit work below and never feeds
/// the wire amount directly. From there on everything is string arithmetic:
/// excess fractional digits are truncated (never rounded, with a warning),
/// zeros fill the gap, and the reference digits are appended so the result
/// has exactly `asset_decimals` fractional digits.
pub fn encode(
    user_input: &str,
    input_mode: InputMode,
    reference_id: &str,
    asset_decimals: u32,
    asset_price_usd: Option<f64>,
) -> AmountEncoding {
    let trimmed = user_input.trim();
    if !decimal::is_strictly_positive(trimmed) {
        return AmountEncoding::rejected(
            user_input,
            input_mode,
            reference_id,
            asset_decimals,
            "amount must be a positive number".to_string(),
        );
    }
    if reference_id.is_empty() || !reference_id.bytes().all(|b| b.is_ascii_digit()) {
        return AmountEncoding::rejected(
            user_input,
            input_mode,
            reference_id,
            asset_decimals,
            "reference ID must be a non-empty digit string".to_string(),
        );
    }
    let ref_len = reference_id.len() as u32;
    if ref_len > asset_decimals {
        return AmountEncoding::rejected(
            user_input,
            input_mode,
            reference_id,
            asset_decimals,
            format!(
                "reference ID has {ref_len} digits but the asset only carries {asset_decimals} decimals"
            ),
        );
    }

    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    let asset_value = match input_mode {
        InputMode::Asset => trimmed.to_string(),
        InputMode::Usd => match asset_price_usd {
            Some(price) if price > 0.0 => {
                let usd: f64 = trimmed.parse().unwrap_or(0.0);
                format!("{:.*}", asset_decimals as usize, usd / price)
            }
            _ => {
                return AmountEncoding::rejected(
                    user_input,
                    input_mode,
                    reference_id,
                    asset_decimals,
                    "asset price unavailable for USD input".to_string(),
                );
            }
        },
    };

    let max_user_decimals = (asset_decimals - ref_len) as usize;
    let (int_part, frac_part) = decimal::split_decimal(&asset_value);
    let truncated = decimal::truncate_fraction(frac_part, max_user_decimals);
    if truncated.len() < frac_part.len() && frac_part[truncated.len()..].bytes().any(|b| b != b'0')
    {
        warnings.push(format!(
            "input truncated to {max_user_decimals} decimal places to make room for the reference digits"
        ));
    }

    let zeros_needed = asset_decimals as usize - truncated.len() - reference_id.len();
    let mut final_fraction = String::with_capacity(asset_decimals as usize);
    final_fraction.push_str(truncated);
    final_fraction.extend(std::iter::repeat_n('0', zeros_needed));
    final_fraction.push_str(reference_id);

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let final_amount = format!("{int_part}.{final_fraction}");

    let base_amount = match base_amount_for(&final_amount, reference_id, asset_decimals) {
        Ok(Some(base)) => base,
        Ok(None) => {
            errors.push(
                "amount too small - base amount excluding reference ID must exceed 0".to_string(),
            );
            String::new()
        }
        Err(_) => {
            errors.push("amount exceeds the representable range".to_string());
            String::new()
        }
    };

    AmountEncoding {
        raw_user_input: user_input.to_string(),
        input_mode,
        asset_decimals,
        reference_id: reference_id.to_string(),
        final_amount,
        base_amount,
        warnings,
        errors,
    }
}

/// Amount left once the reference digits at the last `reference_id.len()`
/// decimal places are removed. `None` when nothing remains: sending only the
/// reference digits would be indistinguishable from dust.
fn base_amount_for(
    final_amount: &str,
    reference_id: &str,
    asset_decimals: u32,
) -> crate::error::Result<Option<String>> {
    let raw_final = decimal::raw_value(final_amount, asset_decimals)?;
    let raw_reference = reference_id
        .parse::<u128>()
        .map_err(|_| crate::error::MemolessError::Overflow)?;
    let base = raw_final - raw_reference;
    if base == 0 {
        return Ok(None);
    }
    Ok(Some(decimal::format_raw(base, asset_decimals)))
}

/// Independently re-derive whether `amount` carries `reference_id` in its
/// trailing digits.
///
/// Deliberately not a corollary of [`encode`]: the network's memo-check
/// endpoint re-validates candidate amounts on its side and the two must be
/// cross-checked bit-for-bit, so this reproduces the digit slicing from
/// scratch against an already-built amount.
pub fn validate(amount: &str, reference_id: &str, asset_decimals: u32) -> bool {
    if !decimal::is_decimal_string(amount) || reference_id.is_empty() {
        return false;
    }
    let ref_len = reference_id.len();
    if ref_len > asset_decimals as usize {
        return false;
    }
    let (_, frac_part) = decimal::split_decimal(amount);
    let padded = decimal::pad_fraction(frac_part, asset_decimals as usize);
    padded[padded.len() - ref_len..] == *reference_id
}

/// Strictly-above-dust check, computed in raw units so no division happens.
///
/// The raw threshold is interpreted at the asset's own `asset_decimals`;
/// callers on chains that publish thresholds in a different convention must
/// rescale before calling.
pub fn validate_dust_threshold(amount: &str, dust_threshold_raw: u64, asset_decimals: u32) -> bool {
    match decimal::raw_value(amount, asset_decimals) {
        Ok(raw) => raw > u128::from(dust_threshold_raw),
        Err(_) => false,
    }
}

/// Display-only conversion for input-mode switching. Float arithmetic is
/// acceptable here: the result never reaches the wire amount path.
pub fn convert_usd_to_asset(usd: f64, asset_price_usd: f64) -> f64 {
    usd / asset_price_usd
}

/// Display-only inverse of [`convert_usd_to_asset`].
pub fn convert_asset_to_usd(asset_amount: f64, asset_price_usd: f64) -> f64 {
    asset_amount * asset_price_usd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_appends_reference_digits() {
        let enc = encode("1", InputMode::Asset, "00003", 8, None);
        assert!(enc.is_valid());
        assert_eq!(enc.final_amount, "1.00000003");
        assert_eq!(enc.base_amount, "1.00000000");
        assert!(enc.warnings.is_empty());
    }

    #[test]
    fn test_encode_six_decimal_asset() {
        let enc = encode("1", InputMode::Asset, "12345", 6, None);
        assert!(enc.is_valid());
        assert_eq!(enc.final_amount, "1.012345");
    }

    #[test]
    fn test_encode_truncates_excess_digits() {
        let enc = encode("1.234567899", InputMode::Asset, "00003", 8, None);
        assert!(enc.is_valid());
        assert_eq!(enc.final_amount, "1.23400003");
        assert_eq!(enc.warnings.len(), 1);
    }

    #[test]
    fn test_encode_never_rounds() {
        // The dropped digit is 9; rounding would have produced 1.24.
        let enc = encode("1.239", InputMode::Asset, "00003", 8, None);
        assert_eq!(enc.final_amount, "1.23000003");
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        for bad in ["", "abc", "0", "-1", "1.2.3"] {
            let enc = encode(bad, InputMode::Asset, "00003", 8, None);
            assert!(!enc.is_valid(), "expected rejection for {bad:?}");
            assert!(enc.final_amount.is_empty());
        }
    }

    #[test]
    fn test_encode_rejects_reference_only_amount() {
        // 0.00000003 minus the reference digits leaves nothing.
        let enc = encode("0.00000003", InputMode::Asset, "00003", 8, None);
        assert!(!enc.is_valid());
        assert!(enc.errors[0].contains("base amount"));
    }

    #[test]
    fn test_encode_rejects_oversized_reference() {
        let enc = encode("1", InputMode::Asset, "123456789", 8, None);
        assert!(!enc.is_valid());
    }

    #[test]
    fn test_encode_usd_mode_uses_price() {
        let enc = encode("100", InputMode::Usd, "00003", 8, Some(50.0));
        assert!(enc.is_valid());
        // 100 USD at 50 USD/asset = 2 asset units, reference appended.
        assert_eq!(enc.final_amount, "2.00000003");
    }

    #[test]
    fn test_encode_usd_mode_without_price_errors() {
        let enc = encode("100", InputMode::Usd, "00003", 8, None);
        assert!(!enc.is_valid());
    }

    #[test]
    fn test_validate_roundtrip() {
        let enc = encode("1", InputMode::Asset, "00003", 8, None);
        assert!(validate(&enc.final_amount, "00003", 8));
        assert!(validate("1.00000003", "00003", 8));
        assert!(!validate("1.00000004", "00003", 8));
    }

    #[test]
    fn test_validate_pads_short_fractions() {
        // 1.5 at 8 decimals reads as 1.50000000; trailing digits are zeros.
        assert!(validate("1.5", "00000", 8));
        assert!(!validate("1.5", "00003", 8));
    }

    #[test]
    fn test_validate_is_not_fooled_by_extra_digits() {
        // Digits beyond asset precision are cut before the comparison.
        assert!(validate("1.0000000399", "00003", 8));
    }

    #[test]
    fn test_dust_threshold_strict() {
        // dust raw 1000 at 8 decimals = 0.00001
        assert!(validate_dust_threshold("0.00002", 1000, 8));
        assert!(!validate_dust_threshold("0.000005", 1000, 8));
        // Equality is rejected.
        assert!(!validate_dust_threshold("0.00001", 1000, 8));
        // One raw unit above passes.
        assert!(validate_dust_threshold("0.00001001", 1000, 8));
    }

    #[test]
    fn test_usd_conversions_are_inverse() {
        let asset = convert_usd_to_asset(100.0, 25.0);
        assert!((asset - 4.0).abs() < f64::EPSILON);
        let usd = convert_asset_to_usd(asset, 25.0);
        assert!((usd - 100.0).abs() < f64::EPSILON);
    }
}
