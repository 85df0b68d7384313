//! Trunk file settings.
//!
//! Resolved in a fixed order: slot min size, trunk file size, then slot max
//! size, whose default and upper bound come from the trunk file size and
//! whose lower bound comes from slot min size. Out-of-range sizes are
//! clamped with a warning, except slot max <= slot min, which fails.

use crate::config::{TimeOfDay, TrunkingPolicy};
use crate::error::{ConfigError, Result};
use crate::resolver::ResolveContext;
use crate::size::{ONE_KB, ONE_MB};

pub const DEFAULT_SLOT_MIN_SIZE: u64 = 256;
pub const SLOT_MIN_SIZE_LIMIT: u64 = 64 * ONE_KB;
pub const DEFAULT_TRUNK_FILE_SIZE: u64 = 64 * ONE_MB;
pub const TRUNK_FILE_SIZE_FLOOR: u64 = 4 * ONE_MB;
pub const DEFAULT_CREATE_FILE_TIME_BASE: TimeOfDay = TimeOfDay { hour: 2, minute: 0 };
pub const DEFAULT_CREATE_FILE_INTERVAL: u32 = 86400;

fn resolve_slot_min_size(ctx: &ResolveContext) -> Result<u64> {
    let slot_min_size = ctx.source.get_bytes("slot_min_size", DEFAULT_SLOT_MIN_SIZE)?;
    if slot_min_size == 0 {
        return Err(ConfigError::invalid("slot_min_size", "0", "must be > 0"));
    }
    if slot_min_size > SLOT_MIN_SIZE_LIMIT {
        ctx.warn_adjusted("slot_min_size", slot_min_size, "64KB", "is too large");
        return Ok(SLOT_MIN_SIZE_LIMIT);
    }
    Ok(slot_min_size)
}

fn resolve_trunk_file_size(ctx: &ResolveContext) -> Result<u64> {
    let trunk_file_size = ctx.source.get_bytes("trunk_file_size", DEFAULT_TRUNK_FILE_SIZE)?;
    if trunk_file_size < TRUNK_FILE_SIZE_FLOOR {
        ctx.warn_adjusted("trunk_file_size", trunk_file_size, "4MB", "is too small");
        return Ok(TRUNK_FILE_SIZE_FLOOR);
    }
    Ok(trunk_file_size)
}

fn resolve_slot_max_size(ctx: &ResolveContext, slot_min_size: u64, trunk_file_size: u64) -> Result<u64> {
    let half_trunk = trunk_file_size / 2;
    let slot_max_size = ctx.source.get_bytes("slot_max_size", half_trunk)?;
    if slot_max_size <= slot_min_size {
        return Err(ConfigError::invalid(
            "slot_max_size",
            slot_max_size.to_string(),
            format!("must be > slot_min_size: {}", slot_min_size),
        ));
    }
    if slot_max_size > half_trunk {
        ctx.warn_adjusted("slot_max_size", slot_max_size, half_trunk, "is too large");
        return Ok(half_trunk);
    }
    Ok(slot_max_size)
}

pub fn resolve_trunking(ctx: &ResolveContext) -> Result<TrunkingPolicy> {
    let source = ctx.source;
    let enabled = source.get_bool("use_trunk_file", false)?;

    let slot_min_size = resolve_slot_min_size(ctx)?;
    let trunk_file_size = resolve_trunk_file_size(ctx)?;
    let slot_max_size = resolve_slot_max_size(ctx, slot_min_size, trunk_file_size)?;

    let create_file_advance = source.get_bool("trunk_create_file_advance", false)?;
    let create_file_time_base = source.get_time_of_day("trunk_create_file_time_base", DEFAULT_CREATE_FILE_TIME_BASE)?;
    let create_file_interval = ctx.positive_or_default("trunk_create_file_interval", DEFAULT_CREATE_FILE_INTERVAL)?;
    let create_file_space_threshold = source.get_bytes("trunk_create_file_space_threshold", 0)?;

    Ok(TrunkingPolicy {
        enabled,
        trunk_file_size,
        slot_min_size,
        slot_max_size,
        create_file_advance,
        create_file_time_base,
        create_file_interval,
        create_file_space_threshold,
        init_check_occupying: source.get_bool("trunk_init_check_occupying", false)?,
        init_reload_from_binlog: source.get_bool("trunk_init_reload_from_binlog", false)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::size::ONE_GB;
    use crate::source::mock_source::MockSource;
    use crate::test_logger;
    use log::Level;
    use serial_test::serial;
    use std::path::Path;

    fn trunk_for(source: &MockSource) -> Result<TrunkingPolicy> {
        resolve_trunking(&ResolveContext::new(source, Path::new("tracker.conf")))
    }

    #[test]
    fn test_defaults() {
        let trunk = trunk_for(&MockSource::new()).unwrap();
        assert!(!trunk.enabled);
        assert_eq!(trunk.slot_min_size, 256);
        assert_eq!(trunk.trunk_file_size, 64 * ONE_MB);
        assert_eq!(trunk.slot_max_size, 32 * ONE_MB);
        assert!(!trunk.create_file_advance);
        assert_eq!(trunk.create_file_time_base, TimeOfDay { hour: 2, minute: 0 });
        assert_eq!(trunk.create_file_interval, 86400);
        assert_eq!(trunk.create_file_space_threshold, 0);
        assert!(!trunk.init_check_occupying);
        assert!(!trunk.init_reload_from_binlog);
    }

    #[test]
    #[serial]
    fn test_trunk_file_size_clamped_up() {
        test_logger::install();
        let source = MockSource::new().with("trunk_file_size", "1MB");
        let trunk = trunk_for(&source).unwrap();
        assert_eq!(trunk.trunk_file_size, 4 * ONE_MB);
        assert_eq!(trunk.slot_max_size, 2 * ONE_MB);

        let warnings = test_logger::messages_at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("\"trunk_file_size\" 1048576 is too small, change to 4MB"));
    }

    #[test]
    #[serial]
    fn test_each_clamp_warns_once() {
        test_logger::install();
        let source = MockSource::new().with("trunk_file_size", "1MB").with("slot_max_size", "8MB");
        let trunk = trunk_for(&source).unwrap();
        assert_eq!(trunk.trunk_file_size, 4 * ONE_MB);
        assert_eq!(trunk.slot_max_size, 2 * ONE_MB);

        let warnings = test_logger::messages_at(Level::Warn);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings.iter().filter(|w| w.contains("\"trunk_file_size\"")).count(), 1);
        assert_eq!(warnings.iter().filter(|w| w.contains("\"slot_max_size\"")).count(), 1);
        assert!(warnings[1].contains("8388608 is too large, change to 2097152"));

        let source = MockSource::new().with("slot_min_size", "100000");
        trunk_for(&source).unwrap();
        let warnings = test_logger::messages_at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("\"slot_min_size\" 100000 is too large, change to 64KB"));
    }

    #[test]
    #[serial]
    fn test_in_range_sizes_do_not_warn() {
        test_logger::install();
        let source = MockSource::new().with("trunk_file_size", "16MB").with("slot_max_size", "1MB");
        trunk_for(&source).unwrap();
        assert!(test_logger::messages_at(Level::Warn).is_empty());
    }

    #[test]
    fn test_slot_min_size_clamped_down() {
        let source = MockSource::new().with("slot_min_size", "100000");
        let trunk = trunk_for(&source).unwrap();
        assert_eq!(trunk.slot_min_size, 64 * 1024);
        assert_eq!(trunk.slot_max_size, trunk.trunk_file_size / 2);
    }

    #[test]
    fn test_slot_min_size_zero_fails() {
        let source = MockSource::new().with("slot_min_size", "0");
        assert_eq!(trunk_for(&source).unwrap_err().kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_slot_max_not_above_slot_min_fails() {
        let source = MockSource::new().with("slot_min_size", "4KB").with("slot_max_size", "4KB");
        let err = trunk_for(&source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert!(err.to_string().contains("slot_max_size"));

        let source = MockSource::new().with("slot_min_size", "4KB").with("slot_max_size", "1KB");
        assert!(trunk_for(&source).is_err());
    }

    #[test]
    fn test_slot_max_clamped_to_half_trunk() {
        let source = MockSource::new().with("trunk_file_size", "8MB").with("slot_max_size", "16MB");
        let trunk = trunk_for(&source).unwrap();
        assert_eq!(trunk.slot_max_size, 4 * ONE_MB);

        let source = MockSource::new().with("slot_max_size", "1MB");
        assert_eq!(trunk_for(&source).unwrap().slot_max_size, ONE_MB);
    }

    #[test]
    fn test_scheduling_and_flags() {
        let source = MockSource::new()
            .with("use_trunk_file", "true")
            .with("trunk_create_file_advance", "true")
            .with("trunk_create_file_time_base", "03:30")
            .with("trunk_create_file_interval", "3600")
            .with("trunk_create_file_space_threshold", "20G")
            .with("trunk_init_check_occupying", "true")
            .with("trunk_init_reload_from_binlog", "yes");
        let trunk = trunk_for(&source).unwrap();
        assert!(trunk.enabled);
        assert!(trunk.create_file_advance);
        assert_eq!(trunk.create_file_time_base, TimeOfDay { hour: 3, minute: 30 });
        assert_eq!(trunk.create_file_interval, 3600);
        assert_eq!(trunk.create_file_space_threshold, 20 * ONE_GB);
        assert!(trunk.init_check_occupying);
        assert!(trunk.init_reload_from_binlog);
    }

    #[test]
    fn test_malformed_time_base() {
        let source = MockSource::new().with("trunk_create_file_time_base", "2am");
        assert_eq!(trunk_for(&source).unwrap_err().kind(), ErrorKind::InvalidValue);
    }
}
