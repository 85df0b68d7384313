//! Storage Identity Registry
//!
//! Maps a storage node's (group name, IPv4 address) pair to its stable
//! identifier. The registry is built once from the storage ids file, kept
//! sorted by (group name, address), and only read afterwards, so lookups
//! from any number of threads need no locking.

pub mod loader;

use serde::Serialize;
use std::cmp::Ordering;
use std::net::Ipv4Addr;

pub use loader::load_configured;

/// Longest accepted storage id, in bytes
pub const STORAGE_ID_MAX_LEN: usize = 15;

/// Longest accepted group name, in bytes
pub const GROUP_NAME_MAX_LEN: usize = 16;

/// One line of the storage ids file
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StorageIdInfo {
    pub id: String,
    pub group_name: String,
    pub ip_addr: Ipv4Addr,
}

fn compare_key(group_a: &str, addr_a: Ipv4Addr, group_b: &str, addr_b: Ipv4Addr) -> Ordering {
    group_a
        .as_bytes()
        .cmp(group_b.as_bytes())
        .then_with(|| u32::from(addr_a).cmp(&u32::from(addr_b)))
}

/// Group name as stored in the index: surrounding whitespace dropped and
/// cut to `GROUP_NAME_MAX_LEN` bytes.
pub fn normalize_group_name(group_name: &str) -> &str {
    let trimmed = group_name.trim();
    let mut end = trimmed.len().min(GROUP_NAME_MAX_LEN);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    &trimmed[..end]
}

/// Sorted, read-only index of storage identities
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageIdRegistry {
    records: Vec<StorageIdInfo>,
}

impl StorageIdRegistry {
    /// Registry used when storage ids are disabled
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index. Records sharing a key keep their file order.
    pub fn from_records(mut records: Vec<StorageIdInfo>) -> Self {
        records.sort_by(|a, b| compare_key(&a.group_name, a.ip_addr, &b.group_name, b.ip_addr));
        Self { records }
    }

    /// Look up by group name and a dotted-quad address or host name.
    /// Host names that do not resolve are reported as not found.
    pub fn lookup(&self, group_name: &str, addr_or_host: &str) -> Option<&StorageIdInfo> {
        let ip_addr = loader::resolve_ipv4(addr_or_host)?;
        self.lookup_addr(group_name, ip_addr)
    }

    /// Look up by group name and address. The group name is normalized
    /// first. With duplicate keys the record listed first in the file is
    /// returned.
    pub fn lookup_addr(&self, group_name: &str, ip_addr: Ipv4Addr) -> Option<&StorageIdInfo> {
        let group_name = normalize_group_name(group_name);
        let index = self.records.partition_point(|r| {
            compare_key(&r.group_name, r.ip_addr, group_name, ip_addr) == Ordering::Less
        });
        self.records
            .get(index)
            .filter(|r| r.group_name == group_name && r.ip_addr == ip_addr)
    }

    /// First record carrying `id`, in sorted order
    pub fn find_by_id(&self, id: &str) -> Option<&StorageIdInfo> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records in (group name, address) order
    pub fn iter(&self) -> impl Iterator<Item = &StorageIdInfo> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pairs of records sharing a (group name, address) key
    pub(crate) fn duplicates(&self) -> impl Iterator<Item = (&StorageIdInfo, &StorageIdInfo)> {
        self.records
            .windows(2)
            .filter(|w| w[0].group_name == w[1].group_name && w[0].ip_addr == w[1].ip_addr)
            .map(|w| (&w[0], &w[1]))
    }
}
