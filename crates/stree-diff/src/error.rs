//! Error types for the diff crate.
//!
//! Diffing itself never fails: unresolvable paths, stale handles and
//! unexportable values all degrade to "absent" or "not equal". Errors only
//! come from loading configuration.

/// Errors that can occur while setting up a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The configuration text could not be parsed.
    #[error("invalid diff configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
