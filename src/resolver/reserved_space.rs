//! Reserved storage space: absolute size or percentage of capacity

use crate::config::ReservedSpace;
use crate::error::{ConfigError, Result};
use crate::resolver::ResolveContext;
use crate::size::{self, ONE_MB};

pub const DEFAULT_RESERVED_MB: u64 = 1024;

const KEY: &str = "reserved_storage_space";

/// Parse a reserved space value. A trailing `%` selects a ratio, which must
/// lie strictly between 0 and 100; anything else is a byte size rounded
/// down to whole megabytes.
pub fn parse_reserved_space(raw: &str) -> Result<ReservedSpace> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ConfigError::EmptyValue { key: KEY });
    }

    if let Some(ratio) = value.strip_suffix('%') {
        let ratio: f64 = ratio
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(KEY, raw, "expect a number before '%'"))?;
        if !(ratio > 0.0 && ratio < 100.0) {
            return Err(ConfigError::invalid(KEY, raw, "ratio must be > 0% and < 100%"));
        }
        return Ok(ReservedSpace::RatioPercent(ratio));
    }

    let bytes = size::parse_bytes(value).map_err(|e| match e {
        ConfigError::InvalidSize { reason, .. } => ConfigError::invalid(KEY, raw, reason),
        other => other,
    })?;
    Ok(ReservedSpace::AbsoluteMb(bytes / ONE_MB))
}

pub fn resolve_reserved_space(ctx: &ResolveContext) -> Result<ReservedSpace> {
    match ctx.source.get_str(KEY) {
        None => Ok(ReservedSpace::AbsoluteMb(DEFAULT_RESERVED_MB)),
        Some(raw) => parse_reserved_space(raw),
    }
}
