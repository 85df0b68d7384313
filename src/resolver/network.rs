//! Network endpoint and worker limits

use crate::error::{ConfigError, Result};
use crate::resolver::ResolveContext;

pub const DEFAULT_CONNECT_TIMEOUT: u32 = 30;
pub const DEFAULT_NETWORK_TIMEOUT: u32 = 30;
pub const DEFAULT_TRACKER_PORT: u16 = 22000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 256;
pub const DEFAULT_WORK_THREADS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub connect_timeout: u32,
    pub network_timeout: u32,
    pub port: u16,
    pub bind_addr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_connections: u32,
    pub work_threads: u32,
}

pub fn resolve_network(ctx: &ResolveContext) -> Result<NetworkSettings> {
    let connect_timeout = ctx.positive_or_default("connect_timeout", DEFAULT_CONNECT_TIMEOUT)?;
    let network_timeout = ctx.positive_or_default("network_timeout", DEFAULT_NETWORK_TIMEOUT)?;

    let port = ctx.positive_or_default("port", DEFAULT_TRACKER_PORT as u32)?;
    let port = u16::try_from(port).map_err(|_| ConfigError::invalid("port", port.to_string(), "must be <= 65535"))?;

    let bind_addr = ctx.source.get_str("bind_addr").unwrap_or_default().to_string();

    Ok(NetworkSettings {
        connect_timeout,
        network_timeout,
        port,
        bind_addr,
    })
}

/// Connection ceiling and worker count. Zero workers has no sane default.
pub fn resolve_limits(ctx: &ResolveContext) -> Result<Limits> {
    let max_connections = ctx.positive_or_default("max_connections", DEFAULT_MAX_CONNECTIONS)?;

    let work_threads = ctx.source.get_int("work_threads", DEFAULT_WORK_THREADS as i64)?;
    if work_threads <= 0 {
        return Err(ConfigError::invalid("work_threads", work_threads.to_string(), "must be > 0"));
    }
    let work_threads = u32::try_from(work_threads)
        .map_err(|_| ConfigError::invalid("work_threads", work_threads.to_string(), "value is too large"))?;

    Ok(Limits {
        max_connections,
        work_threads,
    })
}
