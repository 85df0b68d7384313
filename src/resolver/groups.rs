//! Group and server selection strategies

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{DownloadServer, GroupsPolicy, StoreLookup, StorePath, StoreServer};
use crate::error::{ConfigError, Result};
use crate::resolver::ResolveContext;

lazy_static! {
    static ref GROUP_NAME: Regex = Regex::new(r"^[0-9A-Za-z]{1,16}$").expect("group name pattern");
}

/// Group names are 1 to 16 ASCII letters or digits
pub fn is_valid_group_name(name: &str) -> bool {
    GROUP_NAME.is_match(name)
}

/// Store lookup strategy and, for `SpecifiedGroup`, the target group
pub fn resolve_store_lookup(ctx: &ResolveContext) -> Result<(StoreLookup, String)> {
    let code = ctx.source.get_int("store_lookup", StoreLookup::RoundRobin.code() as i64)?;
    let store_lookup = StoreLookup::from_code(code)
        .ok_or_else(|| ConfigError::invalid("store_lookup", code.to_string(), "expect 0, 1 or 2"))?;
    if store_lookup != StoreLookup::SpecifiedGroup {
        return Ok((store_lookup, String::new()));
    }

    let group = ctx.source.get_str("store_group").ok_or_else(|| ctx.missing("store_group"))?;
    if group.is_empty() {
        return Err(ConfigError::EmptyValue { key: "store_group" });
    }
    if !is_valid_group_name(group) {
        return Err(ConfigError::invalid("store_group", group, "the group name is invalid"));
    }
    Ok((store_lookup, group.to_string()))
}

/// Read an integer strategy code; unknown codes fall back to `fallback`
fn strategy_or_fallback<T: Copy>(
    ctx: &ResolveContext,
    key: &str,
    fallback: T,
    fallback_code: u8,
    from_code: fn(i64) -> Option<T>,
) -> Result<T> {
    let code = ctx.source.get_int(key, fallback_code as i64)?;
    Ok(from_code(code).unwrap_or_else(|| {
        ctx.warn_adjusted(key, code, format!("{} (round robin)", fallback_code), "is invalid");
        fallback
    }))
}

pub fn resolve_groups(ctx: &ResolveContext) -> Result<GroupsPolicy> {
    let (store_lookup, store_group) = resolve_store_lookup(ctx)?;

    let store_server = strategy_or_fallback(
        ctx,
        "store_server",
        StoreServer::RoundRobin,
        StoreServer::RoundRobin.code(),
        StoreServer::from_code,
    )?;
    let download_server = strategy_or_fallback(
        ctx,
        "download_server",
        DownloadServer::RoundRobin,
        DownloadServer::RoundRobin.code(),
        DownloadServer::from_code,
    )?;
    let store_path = strategy_or_fallback(
        ctx,
        "store_path",
        StorePath::RoundRobin,
        StorePath::RoundRobin.code(),
        StorePath::from_code,
    )?;

    Ok(GroupsPolicy {
        store_lookup,
        store_group,
        store_server,
        download_server,
        store_path,
    })
}
