//! Engine Module
//!
//! Wires the block store and the WAL together from a `Config`.
//!
//! ## Responsibilities
//! - Validate configuration
//! - Bootstrap the data directory
//! - Open the WAL writer on the configured log file
//! - Expose append / flush / iterate to the rest of the database

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::storage::{BlockStorage, FileManager};
use crate::wal::{Lsn, WalIterator, WalWriter};

/// Storage kernel: one file manager plus the write-ahead log
///
/// `Engine` is `Send + Sync`; share it behind an `Arc` and call
/// `append` from any thread.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Block store for every file in the data directory
    storage: Arc<FileManager>,

    /// Write-ahead log (internally locked)
    wal: WalWriter,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Open/create the data directory and clean temp files
    /// 3. Open the WAL, creating its first block if the log is empty
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let storage = Arc::new(FileManager::new(&config.data_dir, config.page_size)?);

        let block_storage: Arc<dyn BlockStorage> = storage.clone();
        let wal = WalWriter::open(block_storage, config.wal_file.clone())?;

        tracing::info!(
            "Engine opened at {} (page size {}, wal {} at block {}, new: {})",
            config.data_dir.display(),
            config.page_size,
            config.wal_file,
            wal.current_block().block_num(),
            storage.is_new()
        );

        Ok(Self {
            config,
            storage,
            wal,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Append a record to the WAL, returning its LSN
    pub fn append(&self, record: &[u8]) -> Result<Lsn> {
        self.wal.append(record)
    }

    /// Make the WAL durable up to `lsn`
    pub fn flush(&self, lsn: Lsn) -> Result<()> {
        self.wal.flush(lsn)
    }

    /// Flush the WAL and iterate its records newest first
    pub fn iterator(&self) -> Result<WalIterator> {
        self.wal.iterator()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the block store
    pub fn storage(&self) -> &FileManager {
        &self.storage
    }

    /// Get the WAL writer
    pub fn wal(&self) -> &WalWriter {
        &self.wal
    }

    /// Whether the data directory was created by this open
    pub fn is_new(&self) -> bool {
        self.storage.is_new()
    }

    /// Number of blocks in the WAL file
    pub fn wal_block_count(&self) -> Result<u64> {
        self.storage.file_size_in_blocks(&self.config.wal_file)
    }
}
