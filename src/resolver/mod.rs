//! Configuration Resolver
//!
//! Turns a raw `ConfigSource` into a `ResolvedConfiguration` plus the
//! storage identity registry. Steps run in a fixed order because later
//! steps depend on values derived earlier (slot max defaults from the
//! trunk file size, the fd ceiling from max connections). The first hard
//! failure stops the load; every failure is reported once, here.

pub mod groups;
pub mod network;
pub mod reserved_space;
pub mod trunk;


use log::{error, info, warn, LevelFilter};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_state::TrackerState;
use crate::config::{HttpCheckPolicy, HttpCheckType, ResolvedConfiguration};
use crate::error::{ConfigError, Result};
use crate::privilege;
use crate::rlimit;
use crate::source::ini_file::IniFile;
use crate::source::ConfigSource;
use crate::storage_ids;

pub const DEFAULT_SYNC_LOG_BUFF_INTERVAL: u32 = 10;
pub const DEFAULT_CHECK_ACTIVE_INTERVAL: u32 = 100;
pub const DEFAULT_THREAD_STACK_SIZE: u64 = 64 * 1024;
pub const DEFAULT_STORAGE_SYNC_FILE_MAX_DELAY: u32 = 86400;
pub const DEFAULT_STORAGE_SYNC_FILE_MAX_TIME: u32 = 300;
pub const DEFAULT_HTTP_CHECK_ALIVE_INTERVAL: u32 = 30;

const MDC_CONF_FILE: &str = "conf_file";

/// Shared state for the resolution steps of one load
pub struct ResolveContext<'a> {
    pub source: &'a dyn ConfigSource,
    pub conf_file: &'a Path,
}

impl<'a> ResolveContext<'a> {
    pub fn new(source: &'a dyn ConfigSource, conf_file: &'a Path) -> Self {
        Self { source, conf_file }
    }

    /// Log an automatically corrected value
    pub fn warn_adjusted(&self, key: &str, configured: impl Display, adjusted: impl Display, why: &str) {
        warn!(
            "conf file \"{}\", item \"{}\" {} {}, change to {}",
            self.conf_file.display(),
            key,
            configured,
            why,
            adjusted
        );
    }

    /// Positive integer setting; non-positive values fall back to `default`
    pub fn positive_or_default(&self, key: &str, default: u32) -> Result<u32> {
        let value = self.source.get_int(key, default as i64)?;
        if value <= 0 {
            self.warn_adjusted(key, value, default, "is not positive");
            return Ok(default);
        }
        u32::try_from(value).map_err(|_| ConfigError::invalid(key, value.to_string(), "value is too large"))
    }

    pub fn missing(&self, key: &'static str) -> ConfigError {
        ConfigError::MissingKey {
            file: self.conf_file.to_path_buf(),
            key,
        }
    }
}

/// Read `conf_file` and resolve it
pub fn load(conf_file: impl AsRef<Path>) -> Result<TrackerState> {
    let conf_file = conf_file.as_ref();
    let ini = IniFile::load(conf_file).map_err(|e| {
        error!("load conf file \"{}\" fail: {}", conf_file.display(), e);
        e
    })?;
    resolve(&ini, conf_file)
}

/// Resolve every setting from `source`. `conf_file` names the primary file
/// for messages and anchors relative storage ids paths.
pub fn resolve(source: &dyn ConfigSource, conf_file: &Path) -> Result<TrackerState> {
    log_mdc::insert(MDC_CONF_FILE, conf_file.display().to_string());
    let result = resolve_steps(&ResolveContext::new(source, conf_file));
    if let Err(e) = &result {
        error!("conf file \"{}\": {}", conf_file.display(), e);
    }
    log_mdc::remove(MDC_CONF_FILE);
    result
}

fn resolve_steps(ctx: &ResolveContext) -> Result<TrackerState> {
    let source = ctx.source;

    if source.get_bool("disabled", false)? {
        return Err(ConfigError::Disabled {
            file: ctx.conf_file.to_path_buf(),
        });
    }

    let base_path = resolve_base_path(ctx)?;
    let log_level = resolve_log_level(ctx);

    let net = network::resolve_network(ctx)?;
    let groups = groups::resolve_groups(ctx)?;
    let reserved_space = reserved_space::resolve_reserved_space(ctx)?;
    let limits = network::resolve_limits(ctx)?;
    rlimit::raise_open_files_limit(limits.max_connections as u64)?;

    let run_as = privilege::resolve_run_as(source.get_str("run_by_group"), source.get_str("run_by_user"))?;

    let sync_log_buff_interval = ctx.positive_or_default("sync_log_buff_interval", DEFAULT_SYNC_LOG_BUFF_INTERVAL)?;
    let check_active_interval = ctx.positive_or_default("check_active_interval", DEFAULT_CHECK_ACTIVE_INTERVAL)?;
    let thread_stack_size = match source.get_bytes("thread_stack_size", DEFAULT_THREAD_STACK_SIZE)? {
        0 => {
            ctx.warn_adjusted("thread_stack_size", 0, DEFAULT_THREAD_STACK_SIZE, "is not positive");
            DEFAULT_THREAD_STACK_SIZE
        }
        size => size,
    };
    let storage_ip_changed_auto_adjust = source.get_bool("storage_ip_changed_auto_adjust", true)?;
    let storage_sync_file_max_delay =
        ctx.positive_or_default("storage_sync_file_max_delay", DEFAULT_STORAGE_SYNC_FILE_MAX_DELAY)?;
    let storage_sync_file_max_time =
        ctx.positive_or_default("storage_sync_file_max_time", DEFAULT_STORAGE_SYNC_FILE_MAX_TIME)?;

    let trunk = trunk::resolve_trunking(ctx)?;
    let (use_storage_id, storage_ids) = storage_ids::load_configured(source, ctx.conf_file)?;
    let http = resolve_http_check(ctx)?;

    let config = ResolvedConfiguration {
        conf_file: ctx.conf_file.to_path_buf(),
        base_path,
        log_level,
        connect_timeout: net.connect_timeout,
        network_timeout: net.network_timeout,
        port: net.port,
        bind_addr: net.bind_addr,
        max_connections: limits.max_connections,
        work_threads: limits.work_threads,
        groups,
        reserved_space,
        run_as,
        sync_log_buff_interval,
        check_active_interval,
        thread_stack_size,
        storage_ip_changed_auto_adjust,
        storage_sync_file_max_delay,
        storage_sync_file_max_time,
        trunk,
        use_storage_id,
        http,
    };

    info!("{}", config.summary(storage_ids.len()));
    Ok(TrackerState::from_parts(Arc::new(config), Arc::new(storage_ids)))
}

fn resolve_base_path(ctx: &ResolveContext) -> Result<PathBuf> {
    let raw = ctx.source.get_str("base_path").ok_or_else(|| ctx.missing("base_path"))?;
    let trimmed = raw.trim_end_matches('/');
    let base_path = PathBuf::from(if trimmed.is_empty() && raw.starts_with('/') { "/" } else { trimmed });

    let metadata = std::fs::metadata(&base_path).map_err(|source| ConfigError::BasePathInaccessible {
        path: base_path.clone(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ConfigError::NotADirectory { path: base_path });
    }
    Ok(base_path)
}

fn resolve_log_level(ctx: &ResolveContext) -> LevelFilter {
    let Some(raw) = ctx.source.get_str("log_level") else {
        return LevelFilter::Info;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "emerg" | "alert" | "crit" | "error" | "err" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "notice" | "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        _ => {
            ctx.warn_adjusted("log_level", raw, "info", "is unknown");
            LevelFilter::Info
        }
    }
}

fn resolve_http_check(ctx: &ResolveContext) -> Result<HttpCheckPolicy> {
    let check_alive_interval = ctx.positive_or_default("http.check_alive_interval", DEFAULT_HTTP_CHECK_ALIVE_INTERVAL)?;
    let check_alive_type = match ctx.source.get_str("http.check_alive_type") {
        Some(raw) if raw.trim().eq_ignore_ascii_case("http") => HttpCheckType::Http,
        _ => HttpCheckType::Tcp,
    };
    let check_alive_uri = match ctx.source.get_str("http.check_alive_uri") {
        None => "/".to_string(),
        Some(uri) if uri.starts_with('/') => uri.to_string(),
        Some(uri) => format!("/{}", uri),
    };
    Ok(HttpCheckPolicy {
        check_alive_interval,
        check_alive_type,
        check_alive_uri,
    })
}
