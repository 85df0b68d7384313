//! Run-as user and group resolution.
//!
//! A configured name must exist in the OS user/group database. An absent or
//! empty name keeps the process's current effective id.

use log::debug;
use nix::unistd::{getegid, geteuid, Group, User};

use crate::config::RunAs;
use crate::error::{ConfigError, Result};

fn unknown(kind: &'static str, name: &str, reason: String) -> ConfigError {
    ConfigError::UnknownPrincipal {
        kind,
        name: name.to_string(),
        reason,
    }
}

/// Numeric gid for a group name, the effective gid when no name is given
pub fn resolve_gid(group: &str) -> Result<u32> {
    if group.is_empty() {
        return Ok(getegid().as_raw());
    }
    match Group::from_name(group) {
        Ok(Some(found)) => Ok(found.gid.as_raw()),
        Ok(None) => Err(unknown("group", group, "no such group".to_string())),
        Err(errno) => Err(unknown("group", group, format!("getgrnam fail: {}", errno))),
    }
}

/// Numeric uid for a user name, the effective uid when no name is given
pub fn resolve_uid(user: &str) -> Result<u32> {
    if user.is_empty() {
        return Ok(geteuid().as_raw());
    }
    match User::from_name(user) {
        Ok(Some(found)) => Ok(found.uid.as_raw()),
        Ok(None) => Err(unknown("user", user, "no such user".to_string())),
        Err(errno) => Err(unknown("user", user, format!("getpwnam fail: {}", errno))),
    }
}

/// Resolve the configured `run_by_group` / `run_by_user` pair
pub fn resolve_run_as(group: Option<&str>, user: Option<&str>) -> Result<RunAs> {
    let group = group.unwrap_or_default().to_string();
    let user = user.unwrap_or_default().to_string();
    let gid = resolve_gid(&group)?;
    let uid = resolve_uid(&user)?;
    debug!("run as group \"{}\" ({}), user \"{}\" ({})", group, gid, user, uid);
    Ok(RunAs { group, user, gid, uid })
}
