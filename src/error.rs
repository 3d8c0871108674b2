//! Error types for pagelog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using PageLogError
pub type Result<T> = std::result::Result<T, PageLogError>;

/// Unified error type for pagelog operations
#[derive(Debug, Error)]
pub enum PageLogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Filesystem bootstrap failure (directory creation, listing, cleanup)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A block read, write or size query failed. Never retried.
    #[error("Storage I/O error on {block}: {source}")]
    StorageIo {
        block: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Page Errors
    // -------------------------------------------------------------------------
    /// Access spanning past the end of the page buffer
    #[error("Page access out of bounds (offset: {offset}, len: {len}, capacity: {capacity})")]
    OutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    /// Record cannot fit in an empty log page
    #[error("WAL record too large: {len} bytes (max {max})")]
    RecordTooLarge { len: usize, max: usize },

    #[error("Data corruption: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PageLogError {
    /// Wrap an I/O failure that happened while touching `block`
    pub(crate) fn storage(block: impl ToString, source: std::io::Error) -> Self {
        PageLogError::StorageIo {
            block: block.to_string(),
            source,
        }
    }
}
