//! In-memory implementation of ConfigSource for testing

use crate::source::ConfigSource;
use std::collections::HashMap;

/// Mock implementation of ConfigSource backed by a map
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    items: HashMap<String, String>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        self.items.remove(key);
    }
}

impl ConfigSource for MockSource {
    fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}
