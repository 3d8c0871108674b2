//! WAL Iterator
//!
//! Replays log records newest → oldest, one block at a time.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;
use crate::storage::{Block, BlockStorage, Page, INT_SIZE};

use super::writer::check_boundary;

/// Iterator over the records of a WAL file, newest first
///
/// Within a page the scan starts at the header boundary (the newest record)
/// and walks toward the end of the page (the oldest record). At the end of
/// the page it moves to the previous block.
pub struct WalIterator {
    storage: Arc<dyn BlockStorage>,
    /// Block currently loaded in `page`
    block: Block,
    /// Private copy of the block, never shared with the writer
    page: Page,
    /// Offset of the next record to return
    current_pos: usize,
    /// Offset of the newest record in `page`
    page_boundary: usize,
    /// Set after an error so iteration stops
    failed: bool,
}

impl WalIterator {
    /// Create an iterator positioned at the newest record of `block`
    pub(crate) fn new(storage: Arc<dyn BlockStorage>, block: Block) -> Result<Self> {
        let page = Page::new(storage.page_size());
        let mut iter = Self {
            storage,
            block: block.clone(),
            page,
            current_pos: 0,
            page_boundary: 0,
            failed: false,
        };

        iter.move_to_block(block)?;
        Ok(iter)
    }

    /// Whether records may remain in this page or an older block
    pub fn has_next(&self) -> bool {
        self.current_pos < self.page.capacity() || self.block.block_num() > 0
    }

    /// Read the next (older) record
    ///
    /// Returns `Ok(None)` once block 0 is exhausted. Zero-length records come
    /// back as `Some` of an empty buffer.
    pub fn next_record(&mut self) -> Result<Option<Bytes>> {
        // Skip pages with nothing left, including blocks that never got a record
        while self.current_pos >= self.page.capacity() {
            if self.block.block_num() == 0 {
                return Ok(None);
            }

            let prev = Block::new(self.block.filename(), self.block.block_num() - 1);
            self.move_to_block(prev)?;
        }

        let record = self.page.get_bytes(self.current_pos)?;
        let record = Bytes::copy_from_slice(record);

        // Records are stored alongside their 4-byte length
        self.current_pos += INT_SIZE + record.len();

        Ok(Some(record))
    }

    /// Block currently being scanned
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Offset of the newest record in the current page
    pub fn page_boundary(&self) -> usize {
        self.page_boundary
    }

    /// Load `block` and reset the cursor to its header boundary
    fn move_to_block(&mut self, block: Block) -> Result<()> {
        self.storage.read(&block, &mut self.page)?;

        self.page_boundary = check_boundary(&self.page, &block)?;
        self.current_pos = self.page_boundary;

        tracing::trace!("WAL iterator moved to {}", block);
        self.block = block;
        Ok(())
    }
}

impl Iterator for WalIterator {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for WalIterator {}
