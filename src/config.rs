//! Configuration for pagelog
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{PageLogError, Result};
use crate::storage::{INT_SIZE, PAGE_SIZE_8K};

/// Default WAL file, relative to the data directory
pub const DEFAULT_WAL_FILE: &str = "wal/log";

/// Smallest usable page: header (4) + one empty record (4) + rollover margin (4)
pub const MIN_PAGE_SIZE: usize = 3 * INT_SIZE;

/// Main configuration for a pagelog instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── wal/
    ///     │   └── log      (write-ahead log)
    ///     └── __tmp_*      (temp tables, removed on open)
    pub data_dir: PathBuf,

    /// Fixed page size shared by every file in the data directory
    pub page_size: usize,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// WAL file name, relative to `data_dir`
    pub wal_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./pagelog_data"),
            page_size: PAGE_SIZE_8K,
            wal_file: DEFAULT_WAL_FILE.to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the page size and WAL file name are usable
    pub fn validate(&self) -> Result<()> {
        if self.page_size < MIN_PAGE_SIZE {
            return Err(PageLogError::Config(format!(
                "page size {} is below the minimum of {} bytes",
                self.page_size, MIN_PAGE_SIZE
            )));
        }

        // Page headers store offsets as u32
        if self.page_size > u32::MAX as usize {
            return Err(PageLogError::Config(format!(
                "page size {} does not fit in a 32-bit page header",
                self.page_size
            )));
        }

        if self.wal_file.trim().is_empty() {
            return Err(PageLogError::Config("WAL file name is empty".to_string()));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the page size (in bytes)
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the WAL file name (relative to the data directory)
    pub fn wal_file(mut self, name: impl Into<String>) -> Self {
        self.config.wal_file = name.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
