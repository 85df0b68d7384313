//! Resolved Tracker Configuration
//!
//! The immutable snapshot produced by one configuration load. Every value
//! here has already been defaulted, converted and validated; nothing in
//! this module reads raw input.

use log::LevelFilter;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

use crate::size::{ONE_GB, ONE_KB, ONE_MB};

/// Policy for choosing the group a new file is written to
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum StoreLookup {
    RoundRobin,
    SpecifiedGroup,
    LoadBalance,
}

impl StoreLookup {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(StoreLookup::RoundRobin),
            1 => Some(StoreLookup::SpecifiedGroup),
            2 => Some(StoreLookup::LoadBalance),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            StoreLookup::RoundRobin => 0,
            StoreLookup::SpecifiedGroup => 1,
            StoreLookup::LoadBalance => 2,
        }
    }
}

/// Policy for choosing the storage server within a group for uploads
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum StoreServer {
    RoundRobin,
    FirstByIp,
    FirstByPriority,
}

impl StoreServer {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(StoreServer::RoundRobin),
            1 => Some(StoreServer::FirstByIp),
            2 => Some(StoreServer::FirstByPriority),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            StoreServer::RoundRobin => 0,
            StoreServer::FirstByIp => 1,
            StoreServer::FirstByPriority => 2,
        }
    }
}

/// Policy for choosing the storage server to download from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum DownloadServer {
    RoundRobin,
    SourceFirst,
}

impl DownloadServer {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(DownloadServer::RoundRobin),
            1 => Some(DownloadServer::SourceFirst),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            DownloadServer::RoundRobin => 0,
            DownloadServer::SourceFirst => 1,
        }
    }
}

/// Policy for choosing the store path on a storage server
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum StorePath {
    RoundRobin,
    LoadBalance,
}

impl StorePath {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(StorePath::RoundRobin),
            2 => Some(StorePath::LoadBalance),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            StorePath::RoundRobin => 0,
            StorePath::LoadBalance => 2,
        }
    }
}

/// Group selection policy
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GroupsPolicy {
    pub store_lookup: StoreLookup,
    /// Non-empty only when `store_lookup` is `SpecifiedGroup`
    pub store_group: String,
    pub store_server: StoreServer,
    pub download_server: DownloadServer,
    pub store_path: StorePath,
}

/// Space withheld on each storage volume
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum ReservedSpace {
    AbsoluteMb(u64),
    /// Percentage of total capacity, strictly between 0 and 100
    RatioPercent(f64),
}

impl fmt::Display for ReservedSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservedSpace::AbsoluteMb(mb) => write!(f, "{}MB", mb),
            ReservedSpace::RatioPercent(ratio) => write!(f, "{:.2}%", ratio),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Trunk file (small file packing) settings
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrunkingPolicy {
    pub enabled: bool,
    pub trunk_file_size: u64,
    pub slot_min_size: u64,
    pub slot_max_size: u64,
    pub create_file_advance: bool,
    pub create_file_time_base: TimeOfDay,
    /// Seconds between scheduled trunk file creation runs
    pub create_file_interval: u32,
    pub create_file_space_threshold: u64,
    pub init_check_occupying: bool,
    pub init_reload_from_binlog: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum HttpCheckType {
    Tcp,
    Http,
}

/// Storage HTTP liveness probing
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HttpCheckPolicy {
    /// Seconds between probes
    pub check_alive_interval: u32,
    pub check_alive_type: HttpCheckType,
    /// Always starts with '/'
    pub check_alive_uri: String,
}

/// OS identity the server switches to after startup
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunAs {
    /// Configured group name, empty when the current group is kept
    pub group: String,
    /// Configured user name, empty when the current user is kept
    pub user: String,
    pub gid: u32,
    pub uid: u32,
}

fn serialize_level<S: Serializer>(level: &LevelFilter, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(level.as_str())
}

/// Every tracker setting, resolved and validated
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfiguration {
    /// File the settings were read from
    pub conf_file: PathBuf,
    pub base_path: PathBuf,
    #[serde(serialize_with = "serialize_level")]
    pub log_level: LevelFilter,
    /// Seconds
    pub connect_timeout: u32,
    /// Seconds
    pub network_timeout: u32,
    pub port: u16,
    /// Empty means all interfaces
    pub bind_addr: String,
    pub max_connections: u32,
    pub work_threads: u32,
    pub groups: GroupsPolicy,
    pub reserved_space: ReservedSpace,
    pub run_as: RunAs,
    /// Seconds
    pub sync_log_buff_interval: u32,
    /// Seconds
    pub check_active_interval: u32,
    pub thread_stack_size: u64,
    pub storage_ip_changed_auto_adjust: bool,
    /// Seconds
    pub storage_sync_file_max_delay: u32,
    /// Seconds
    pub storage_sync_file_max_time: u32,
    pub trunk: TrunkingPolicy,
    pub use_storage_id: bool,
    pub http: HttpCheckPolicy,
}

impl ResolvedConfiguration {
    /// One-line rendering of every value, logged once after a successful load
    pub fn summary(&self, storage_id_count: usize) -> String {
        format!(
            "base_path={}, run_by_group={}, run_by_user={}, \
             connect_timeout={}s, network_timeout={}s, port={}, bind_addr={}, \
             max_connections={}, work_threads={}, store_lookup={}, store_group={}, \
             store_server={}, store_path={}, reserved_storage_space={}, download_server={}, \
             sync_log_buff_interval={}s, check_active_interval={}s, thread_stack_size={} KB, \
             storage_ip_changed_auto_adjust={}, storage_sync_file_max_delay={}s, \
             storage_sync_file_max_time={}s, use_trunk_file={}, slot_min_size={}, \
             slot_max_size={} MB, trunk_file_size={} MB, trunk_create_file_advance={}, \
             trunk_create_file_time_base={}, trunk_create_file_interval={}, \
             trunk_create_file_space_threshold={} GB, trunk_init_check_occupying={}, \
             trunk_init_reload_from_binlog={}, use_storage_id={}, storage_id_count={}, \
             http.check_alive_interval={}s, http.check_alive_type={:?}, http.check_alive_uri={}",
            self.base_path.display(),
            self.run_as.group,
            self.run_as.user,
            self.connect_timeout,
            self.network_timeout,
            self.port,
            self.bind_addr,
            self.max_connections,
            self.work_threads,
            self.groups.store_lookup.code(),
            self.groups.store_group,
            self.groups.store_server.code(),
            self.groups.store_path.code(),
            self.reserved_space,
            self.groups.download_server.code(),
            self.sync_log_buff_interval,
            self.check_active_interval,
            self.thread_stack_size / ONE_KB,
            self.storage_ip_changed_auto_adjust,
            self.storage_sync_file_max_delay,
            self.storage_sync_file_max_time,
            self.trunk.enabled,
            self.trunk.slot_min_size,
            self.trunk.slot_max_size / ONE_MB,
            self.trunk.trunk_file_size / ONE_MB,
            self.trunk.create_file_advance,
            self.trunk.create_file_time_base,
            self.trunk.create_file_interval,
            self.trunk.create_file_space_threshold / ONE_GB,
            self.trunk.init_check_occupying,
            self.trunk.init_reload_from_binlog,
            self.use_storage_id,
            storage_id_count,
            self.http.check_alive_interval,
            self.http.check_alive_type,
            self.http.check_alive_uri,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_codes() {
        assert_eq!(StoreLookup::from_code(1), Some(StoreLookup::SpecifiedGroup));
        assert_eq!(StoreLookup::from_code(3), None);
        assert_eq!(StoreServer::from_code(2), Some(StoreServer::FirstByPriority));
        assert_eq!(DownloadServer::from_code(2), None);
        assert_eq!(StorePath::from_code(1), None);
        assert_eq!(StorePath::LoadBalance.code(), 2);
    }

    #[test]
    fn test_reserved_space_display() {
        assert_eq!(ReservedSpace::AbsoluteMb(1024).to_string(), "1024MB");
        assert_eq!(ReservedSpace::RatioPercent(10.0).to_string(), "10.00%");
        assert_eq!(ReservedSpace::RatioPercent(12.5).to_string(), "12.50%");
    }

    #[test]
    fn test_time_of_day_display() {
        assert_eq!(TimeOfDay { hour: 2, minute: 5 }.to_string(), "02:05");
    }
}
