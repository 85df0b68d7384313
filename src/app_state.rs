//! Tracker State
//!
//! The result of one configuration load: the resolved settings and the
//! storage identity registry, both behind `Arc` so the pair can be cloned
//! into every worker. Neither half is ever mutated; a reload builds a new
//! `TrackerState` and the owner swaps it in whole.

use std::path::Path;
use std::sync::Arc;

use crate::config::ResolvedConfiguration;
use crate::error::Result;
use crate::resolver;
use crate::storage_ids::{StorageIdInfo, StorageIdRegistry};

#[derive(Debug, Clone)]
pub struct TrackerState {
    pub config: Arc<ResolvedConfiguration>,
    pub storage_ids: Arc<StorageIdRegistry>,
}

impl TrackerState {
    /// Read and resolve the tracker config file at `conf_file`
    pub fn load(conf_file: impl AsRef<Path>) -> Result<Self> {
        resolver::load(conf_file)
    }

    pub fn from_parts(config: Arc<ResolvedConfiguration>, storage_ids: Arc<StorageIdRegistry>) -> Self {
        Self { config, storage_ids }
    }

    /// Storage id for a node, `None` when storage ids are disabled or the
    /// node is not listed
    pub fn storage_id_for(&self, group_name: &str, addr_or_host: &str) -> Option<&StorageIdInfo> {
        if !self.config.use_storage_id {
            return None;
        }
        self.storage_ids.lookup(group_name, addr_or_host)
    }
}
