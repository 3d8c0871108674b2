//! WAL Writer
//!
//! Owns the in-memory tail page of a log file and appends records to it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{PageLogError, Result};
use crate::storage::{Block, BlockStorage, Page, INT_SIZE};

use super::{Lsn, WalIterator};

/// Appends records to a WAL file and flushes them to block storage
///
/// ## Concurrency:
/// - `state`: page, current block and both LSNs behind one Mutex
/// - `append`, `flush` and `iterator` each run as a single critical section
/// - All methods use `&self`
pub struct WalWriter {
    /// Block store the log pages are written to
    storage: Arc<dyn BlockStorage>,

    /// Log file name
    log_file: String,

    /// Mutable writer state
    state: Mutex<WriterState>,
}

struct WriterState {
    /// Tail page, not yet necessarily on disk
    page: Page,

    /// Block the tail page belongs to
    current_block: Block,

    /// LSN of the most recent append (in memory only)
    latest_lsn: Lsn,

    /// Highest LSN known to be on disk
    last_saved_lsn: Lsn,
}

impl WalWriter {
    /// Open a writer on `log_file`
    ///
    /// An empty file gets a fresh first block; otherwise the last block is
    /// loaded so appends continue where the log left off.
    pub fn open(storage: Arc<dyn BlockStorage>, log_file: impl Into<String>) -> Result<Self> {
        let log_file = log_file.into();
        let page_size = storage.page_size();
        let log_size = storage.file_size_in_blocks(&log_file)?;

        let (page, current_block) = if log_size == 0 {
            append_new_block(storage.as_ref(), &log_file)?
        } else {
            let block = Block::new(log_file.clone(), log_size - 1);
            let mut page = Page::new(page_size);
            storage.read(&block, &mut page)?;
            check_boundary(&page, &block)?;

            tracing::debug!("Reopened WAL at {}", block);
            (page, block)
        };

        Ok(Self {
            storage,
            log_file,
            state: Mutex::new(WriterState {
                page,
                current_block,
                latest_lsn: 0,
                last_saved_lsn: 0,
            }),
        })
    }

    /// Append a record to the log page and return its LSN
    ///
    /// If the record doesn't fit in the current page, that page is flushed
    /// and the record goes into a newly appended block. Records are written
    /// from the end of the page toward the header.
    pub fn append(&self, record: &[u8]) -> Result<Lsn> {
        let page_size = self.storage.page_size();

        // Length prefix + payload
        let required = INT_SIZE + record.len();

        // Would not fit even in an empty page; rolling over cannot help
        if required + INT_SIZE > page_size {
            return Err(PageLogError::RecordTooLarge {
                len: record.len(),
                max: page_size.saturating_sub(2 * INT_SIZE),
            });
        }

        let mut state = self.state.lock();

        let mut log_pos = state.page.get_int(0)? as usize;

        // Keep INT_SIZE spare so record data never reaches the header slot
        if required + INT_SIZE > log_pos {
            self.flush_locked(&mut state)?;

            let (page, block) = append_new_block(self.storage.as_ref(), &self.log_file)?;
            state.page = page;
            state.current_block = block;

            log_pos = state.page.get_int(0)? as usize;
        }

        let rec_pos = log_pos - required;
        state.page.set_bytes(rec_pos, record)?;
        state.page.set_int(0, rec_pos as u32)?;

        state.latest_lsn += 1;
        Ok(state.latest_lsn)
    }

    /// Make every record up to `lsn` durable
    ///
    /// Writes the whole tail page if `lsn` is not older than the last saved
    /// LSN, then marks everything appended so far as saved.
    pub fn flush(&self, lsn: Lsn) -> Result<()> {
        let mut state = self.state.lock();
        if lsn >= state.last_saved_lsn {
            self.flush_locked(&mut state)?;
        }
        Ok(())
    }

    /// Flush the tail page and return an iterator over everything on disk
    ///
    /// Records come back newest first.
    pub fn iterator(&self) -> Result<WalIterator> {
        let mut state = self.state.lock();
        self.flush_locked(&mut state)?;
        WalIterator::new(Arc::clone(&self.storage), state.current_block.clone())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// LSN of the most recent append
    pub fn latest_lsn(&self) -> Lsn {
        self.state.lock().latest_lsn
    }

    /// Highest LSN known to be durable
    pub fn last_saved_lsn(&self) -> Lsn {
        self.state.lock().last_saved_lsn
    }

    /// Block currently receiving appends
    pub fn current_block(&self) -> Block {
        self.state.lock().current_block.clone()
    }

    /// Get the log file name
    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write the tail page and advance the saved LSN (lock held)
    fn flush_locked(&self, state: &mut WriterState) -> Result<()> {
        self.storage.write(&state.current_block, &state.page)?;
        state.last_saved_lsn = state.latest_lsn;

        tracing::trace!(
            "Flushed {} up to lsn {}",
            state.current_block,
            state.last_saved_lsn
        );
        Ok(())
    }
}

/// Append an empty block at the end of the log file
///
/// The page header starts at `page_size` (no records yet). The block is
/// written immediately so the file grows by exactly one page.
fn append_new_block(storage: &dyn BlockStorage, log_file: &str) -> Result<(Page, Block)> {
    let page_size = storage.page_size();
    let block_num = storage.file_size_in_blocks(log_file)?;
    let block = Block::new(log_file, block_num);

    let mut page = Page::new(page_size);
    page.set_int(0, page_size as u32)?;
    storage.write(&block, &page)?;

    tracing::debug!("Appended new WAL {}", block);
    Ok((page, block))
}

/// Reject a log page whose header cannot be a free-space boundary
pub(super) fn check_boundary(page: &Page, block: &Block) -> Result<usize> {
    let boundary = page.get_int(0)? as usize;
    if boundary < INT_SIZE || boundary > page.capacity() {
        return Err(PageLogError::Corruption(format!(
            "{} has invalid record boundary {} (page size {})",
            block,
            boundary,
            page.capacity()
        )));
    }
    Ok(boundary)
}
