//! Raw Configuration Source Abstraction
//!
//! The resolver never touches the file format directly. It asks a
//! `ConfigSource` for string values by key and uses the typed accessors
//! below, which apply the caller's default when a key is absent and report
//! malformed values against the key they came from.

pub mod ini_file;
pub mod mock_source;

use chrono::{NaiveTime, Timelike};

use crate::config::TimeOfDay;
use crate::error::{ConfigError, Result};
use crate::size;

/// Trait defining the raw key/value lookup interface
pub trait ConfigSource: Send + Sync {
    /// Raw value for a key, `None` when the key is absent
    fn get(&self, key: &str) -> Option<&str>;

    /// String value, `None` when the key is absent
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)
    }

    /// Signed decimal integer, `default` when the key is absent
    fn get_int(&self, key: &str, default: i64) -> Result<i64> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::invalid(key, raw, "expect an integer")),
        }
    }

    /// Boolean flag, `default` when the key is absent
    fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(ConfigError::invalid(key, raw, "expect true or false")),
            },
        }
    }

    /// Byte size with optional unit suffix, `default` when the key is absent
    fn get_bytes(&self, key: &str, default: u64) -> Result<u64> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => size::parse_bytes(raw).map_err(|e| match e {
                ConfigError::InvalidSize { reason, .. } => ConfigError::invalid(key, raw, reason),
                other => other,
            }),
        }
    }

    /// Time of day in `HH:MM` form, `default` when the key is absent
    fn get_time_of_day(&self, key: &str, default: TimeOfDay) -> Result<TimeOfDay> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => {
                let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                    .map_err(|e| ConfigError::invalid(key, raw, format!("expect HH:MM, {}", e)))?;
                Ok(TimeOfDay {
                    hour: time.hour() as u8,
                    minute: time.minute() as u8,
                })
            }
        }
    }
}
