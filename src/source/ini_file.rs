//! Minimal `key = value` reader for the primary configuration file

use crate::error::{ConfigError, Result};
use crate::source::ConfigSource;
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value items read from an ini-style file
pub struct IniFile {
    path: PathBuf,
    items: HashMap<String, String>,
}

impl IniFile {
    /// Read and parse the file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let mut ini = Self::parse(&content);
        ini.path = path;
        info!("Loaded {} items from {}", ini.items.len(), ini.path.display());
        Ok(ini)
    }

    /// Parse file content. Comments, blank lines and `[section]` headers are
    /// skipped; the first occurrence of a key wins.
    pub fn parse(content: &str) -> Self {
        let mut items = HashMap::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                debug!("line {} has no '=', skipped: {}", index + 1, line);
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            items
                .entry(key.to_string())
                .or_insert_with(|| value.trim().to_string());
        }

        Self {
            path: PathBuf::new(),
            items,
        }
    }

    /// Path the items were read from, empty when parsed from a string
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ConfigSource for IniFile {
    fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}
