//! Error types for configuration loading.
//!
//! Every failure aborts the whole load, so each variant carries enough
//! context (key, value, file, line) to be actionable from the log alone.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required file or key is missing.
    NotFound,
    /// Out-of-range, malformed or unrecognized value.
    InvalidValue,
    /// Allocation or OS-limit failure.
    ResourceExhausted,
    /// Host, user, group or directory cannot be resolved or accessed.
    Environment,
    /// The config file explicitly disables the service.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("conf file \"{}\" must have item \"{key}\"", .file.display())]
    MissingKey { file: PathBuf, key: &'static str },

    #[error("item \"{key}\" is empty")]
    EmptyValue { key: &'static str },

    #[error("item \"{key}\" is invalid, value: \"{value}\", {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid size \"{value}\": {reason}")]
    InvalidSize { value: String, reason: String },

    #[error("can't read file \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("\"{}\" can't be accessed: {source}", .path.display())]
    BasePathInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("\"{}\" is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("storage ids file \"{}\", line no: {line_no}, content: \"{line}\", invalid format, {reason}", .path.display())]
    MalformedIdLine {
        path: PathBuf,
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("storage ids file \"{}\", line no: {line_no}, invalid host name: {host}", .path.display())]
    UnresolvableHost {
        path: PathBuf,
        line_no: usize,
        host: String,
    },

    #[error("storage ids file \"{}\": no storage id", .path.display())]
    NoStorageIds { path: PathBuf },

    #[error("{kind} \"{name}\" not found: {reason}")]
    UnknownPrincipal {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("raise open files limit to {target} fail: {reason}")]
    ResourceLimit { target: u64, reason: String },

    #[error("conf file \"{}\" disabled=true, exit", .file.display())]
    Disabled { file: PathBuf },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::MissingKey { .. } | ConfigError::NoStorageIds { .. } => ErrorKind::NotFound,
            ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            ConfigError::EmptyValue { .. }
            | ConfigError::InvalidValue { .. }
            | ConfigError::InvalidSize { .. }
            | ConfigError::MalformedIdLine { .. } => ErrorKind::InvalidValue,
            ConfigError::ResourceLimit { .. } => ErrorKind::ResourceExhausted,
            ConfigError::Io { .. }
            | ConfigError::BasePathInaccessible { .. }
            | ConfigError::NotADirectory { .. }
            | ConfigError::UnresolvableHost { .. }
            | ConfigError::UnknownPrincipal { .. } => ErrorKind::Environment,
            ConfigError::Disabled { .. } => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn invalid(key: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
