//! Storage Module
//!
//! Fixed-size pages, block addressing and the file-backed block store.
//!
//! ## Responsibilities
//! - Encode integers, byte arrays and strings inside a page
//! - Address page-sized slices of files by (filename, block number)
//! - Read and write whole pages at block offsets
//!
//! ## File Layout
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬─────
//! │   Block 0    │   Block 1    │   Block 2    │ ...
//! │ (page_size)  │ (page_size)  │ (page_size)  │
//! └──────────────┴──────────────┴──────────────┴─────
//! offset(block) = block_num * page_size
//! ```

mod block;
mod file_manager;
mod page;

pub use block::Block;
pub use file_manager::{FileManager, TMP_FILE_PREFIX, WAL_DIR};
pub use page::{Page, INT_SIZE, PAGE_SIZE_8K};

use crate::error::Result;

/// Persists and retrieves pages at block addresses
///
/// Implementations must make reads and writes against the same block
/// linearizable; callers rely on that and add no locking of their own.
pub trait BlockStorage: Send + Sync {
    /// Fill `page` with the bytes stored at `block`
    ///
    /// Reading past end-of-file is not an error: the unread tail of the page
    /// keeps its previous contents.
    fn read(&self, block: &Block, page: &mut Page) -> Result<()>;

    /// Persist `page` at `block`, synchronously
    fn write(&self, block: &Block, page: &Page) -> Result<()>;

    /// Number of whole pages currently in `filename`
    fn file_size_in_blocks(&self, filename: &str) -> Result<u64>;

    /// Page size used for every file
    fn page_size(&self) -> usize;
}
