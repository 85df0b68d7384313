//! Open file descriptor ceiling

use log::{debug, info};
use nix::sys::resource::{getrlimit, setrlimit, Resource};

use crate::error::{ConfigError, Result};

/// Raise the soft `RLIMIT_NOFILE` to at least `target`, keeping the hard
/// limit. Never lowers an existing limit.
pub fn raise_open_files_limit(target: u64) -> Result<()> {
    let target = target as libc::rlim_t;
    let fail = |reason: String| ConfigError::ResourceLimit {
        target: target as u64,
        reason,
    };

    let (soft, hard) = getrlimit(Resource::RLIMIT_NOFILE).map_err(|e| fail(format!("getrlimit fail: {}", e)))?;
    if soft == libc::RLIM_INFINITY || soft >= target {
        debug!("open files limit {} already covers {}", soft, target);
        return Ok(());
    }

    setrlimit(Resource::RLIMIT_NOFILE, target, hard)
        .map_err(|e| fail(format!("setrlimit fail, hard limit: {}, {}", hard, e)))?;
    info!("open files limit raised from {} to {}", soft, target);
    Ok(())
}
