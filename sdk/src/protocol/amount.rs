//! Decimal string to base-unit conversion

use crate::core::{SdkError, SdkResult};

/// Convert a decimal string (e.g. "2.5") into integer base units.
///
/// Fractional digits beyond `decimals` are truncated. Empty, malformed,
/// negative and zero amounts are rejected.
pub fn parse_amount(value: &str, decimals: u8) -> SdkResult<u64> {
    let mut s = value.trim();
    if s.is_empty() {
        return Err(SdkError::Validation("amount is required".to_string()));
    }
    if s.starts_with('-') {
        return Err(SdkError::Validation(format!(
            "amount must be greater than 0, got {}",
            value
        )));
    }
    if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    let (whole_str, frac_str) = match s.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (s, ""),
    };
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole_str.is_empty() && frac_str.is_empty())
        || !is_digits(whole_str)
        || !is_digits(frac_str)
    {
        return Err(SdkError::Validation(format!("invalid amount: {}", value)));
    }

    let scale = 10u64
        .checked_pow(decimals as u32)
        .ok_or_else(|| SdkError::Validation(format!("unsupported precision: {}", decimals)))?;

    let whole: u64 = if whole_str.is_empty() {
        0
    } else {
        whole_str
            .parse()
            .map_err(|_| SdkError::Validation(format!("amount too large: {}", value)))?
    };

    // Right-pad to `decimals` digits, then truncate anything past it
    let digits = decimals as usize;
    let frac_digits: String = frac_str
        .chars()
        .chain(std::iter::repeat('0'))
        .take(digits)
        .collect();
    let frac: u64 = if digits == 0 {
        0
    } else {
        frac_digits
            .parse()
            .map_err(|_| SdkError::Validation(format!("invalid amount: {}", value)))?
    };

    let base_units = whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| SdkError::Validation(format!("amount too large: {}", value)))?;

    if base_units == 0 {
        return Err(SdkError::Validation(format!(
            "amount must be greater than 0, got {}",
            value
        )));
    }
    Ok(base_units)
}

/// Parse an optional amount; blank input means "not provided"
pub fn parse_optional_amount(value: Option<&str>, decimals: u8) -> SdkResult<Option<u64>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_amount(v, decimals).map(Some),
    }
}

/// Render base units back into a decimal string, trimming trailing zeros
pub fn format_amount(base_units: u64, decimals: u8) -> String {
    let scale = 10u128.pow(decimals as u32);
    let whole = base_units as u128 / scale;
    let frac = base_units as u128 % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
