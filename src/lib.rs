// src/lib.rs

pub mod app_state;
pub mod config;
pub mod error;
pub mod privilege;
pub mod resolver;
pub mod rlimit;
pub mod size;
pub mod source;
pub mod storage_ids;

#[cfg(test)]
mod test_logger;

pub use app_state::TrackerState;
pub use config::ResolvedConfiguration;
pub use error::{ConfigError, ErrorKind};
pub use storage_ids::{StorageIdInfo, StorageIdRegistry};
