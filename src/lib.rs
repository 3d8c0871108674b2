//! # pagelog
//!
//! Storage kernel of an embedded relational database:
//! - Fixed-size pages with a big-endian, length-prefixed value encoding
//! - Block addressing and a file-backed block store
//! - Write-Ahead Log (WAL) growing backward inside each page
//! - Newest → oldest replay for crash recovery
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐  iterator  ┌─────────────┐
//!   │  WalWriter  │ ─────────► │ WalIterator │
//!   │  (Mutex)    │            │  (owned)    │
//!   └──────┬──────┘            └──────┬──────┘
//!          │ write                    │ read
//!          ▼                          ▼
//!   ┌─────────────────────────────────────────┐
//!   │        BlockStorage (FileManager)       │
//!   │      Page  ◄──►  Block (file, num)      │
//!   └─────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod wal;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PageLogError, Result};
pub use config::Config;
pub use engine::Engine;
pub use storage::{Block, BlockStorage, FileManager, Page};
pub use wal::{Lsn, WalIterator, WalWriter};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pagelog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
