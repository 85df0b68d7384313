//! Human readable byte sizes ("64MB", "512k", "1G").

use crate::error::{ConfigError, Result};

pub const ONE_KB: u64 = 1024;
pub const ONE_MB: u64 = 1024 * ONE_KB;
pub const ONE_GB: u64 = 1024 * ONE_MB;
pub const ONE_TB: u64 = 1024 * ONE_GB;

fn unit_multiplier(suffix: &str) -> Option<u64> {
    match suffix.to_ascii_uppercase().as_str() {
        "" | "B" => Some(1),
        "K" | "KB" => Some(ONE_KB),
        "M" | "MB" => Some(ONE_MB),
        "G" | "GB" => Some(ONE_GB),
        "T" | "TB" => Some(ONE_TB),
        _ => None,
    }
}

/// Parse a size string into a byte count. A bare number is taken as bytes.
pub fn parse_bytes(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let invalid = |reason: &str| ConfigError::InvalidSize {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.starts_with('-') {
        return Err(invalid("size must not be negative"));
    }

    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(digits_end);
    if digits.is_empty() {
        return Err(invalid("expect a number"));
    }

    let multiplier = unit_multiplier(suffix.trim_start())
        .ok_or_else(|| invalid("unknown unit, expect one of B, KB, MB, GB, TB"))?;
    let magnitude: u64 = digits.parse().map_err(|_| invalid("number is too large"))?;

    magnitude
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("number is too large"))
}
