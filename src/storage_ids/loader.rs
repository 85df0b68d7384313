//! Reading and parsing the storage ids file.
//!
//! Format: one `<id> <group_name> <ip address or host name>` entry per
//! line, fields separated by spaces or tabs. Blank lines and lines whose
//! first non-blank character is `#` are ignored.

use log::{debug, info, warn};
use std::fs;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::source::ConfigSource;
use crate::storage_ids::{StorageIdInfo, StorageIdRegistry, GROUP_NAME_MAX_LEN, STORAGE_ID_MAX_LEN};

/// Resolve a dotted quad directly, anything else through the OS resolver.
/// The first IPv4 answer wins.
pub fn resolve_ipv4(addr_or_host: &str) -> Option<Ipv4Addr> {
    if let Ok(addr) = addr_or_host.parse::<Ipv4Addr>() {
        return Some(addr);
    }
    (addr_or_host, 0)
        .to_socket_addrs()
        .ok()?
        .find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
}

/// Absolute names are used verbatim, relative names are taken from the
/// directory holding the primary config file.
pub fn resolve_ids_path(filename: &str, conf_file: &Path) -> PathBuf {
    let path = Path::new(filename);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match conf_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

/// Read `use_storage_id` and, when set, load the file named by
/// `storage_ids_filename`. Returns the flag and the registry.
pub fn load_configured(source: &dyn ConfigSource, conf_file: &Path) -> Result<(bool, StorageIdRegistry)> {
    let use_storage_id = source.get_bool("use_storage_id", false)?;
    if !use_storage_id {
        return Ok((false, StorageIdRegistry::empty()));
    }

    let filename = source
        .get_str("storage_ids_filename")
        .ok_or_else(|| ConfigError::MissingKey {
            file: conf_file.to_path_buf(),
            key: "storage_ids_filename",
        })?;
    if filename.is_empty() {
        return Err(ConfigError::EmptyValue {
            key: "storage_ids_filename",
        });
    }

    let registry = StorageIdRegistry::load(&resolve_ids_path(filename, conf_file))?;
    Ok((true, registry))
}

fn split_fields(line: &str) -> std::result::Result<(&str, &str, &str), &'static str> {
    let mut fields = line.split(|c| c == ' ' || c == '\t').filter(|f| !f.is_empty());
    let id = fields.next().ok_or("expect storage id")?;
    let group_name = fields.next().ok_or("expect group name and ip address")?;
    let addr = fields.next().ok_or("expect ip address")?;
    if fields.next().is_some() {
        return Err("expect exactly three fields");
    }
    Ok((id, group_name, addr))
}

impl StorageIdRegistry {
    /// Read and parse a storage ids file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse storage ids file content. `path` is only used in error
    /// messages. The first bad line aborts the whole parse.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut records = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line_no = index + 1;
            let malformed = |reason: &str| ConfigError::MalformedIdLine {
                path: path.to_path_buf(),
                line_no,
                line: line.to_string(),
                reason: reason.to_string(),
            };

            let (id, group_name, addr) = split_fields(line).map_err(|reason| malformed(reason))?;
            if id.len() > STORAGE_ID_MAX_LEN {
                return Err(malformed(&format!("storage id longer than {} bytes", STORAGE_ID_MAX_LEN)));
            }
            if group_name.len() > GROUP_NAME_MAX_LEN {
                return Err(malformed(&format!("group name longer than {} bytes", GROUP_NAME_MAX_LEN)));
            }

            let ip_addr = resolve_ipv4(addr).ok_or_else(|| ConfigError::UnresolvableHost {
                path: path.to_path_buf(),
                line_no,
                host: addr.to_string(),
            })?;

            records.push(StorageIdInfo {
                id: id.to_string(),
                group_name: group_name.to_string(),
                ip_addr,
            });
        }

        if records.is_empty() {
            return Err(ConfigError::NoStorageIds {
                path: path.to_path_buf(),
            });
        }

        let registry = Self::from_records(records);
        info!("storage id count: {} from {}", registry.len(), path.display());
        for record in registry.iter() {
            debug!("{}  {}  {}", record.id, record.group_name, record.ip_addr);
        }
        for (first, second) in registry.duplicates() {
            warn!(
                "storage ids {} and {} share group {} and ip {}, lookups return {}",
                first.id, second.id, first.group_name, first.ip_addr, first.id
            );
        }
        Ok(registry)
    }
}
