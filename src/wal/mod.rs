//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through page-based logging.
//!
//! ## Responsibilities
//! - Append records before any mutation is applied
//! - Log Sequence Numbers (LSN) for ordering
//! - Flush on demand, and on rollover to a new block
//! - Replay records newest → oldest for recovery
//!
//! ## Page Format
//! Records grow from the end of the page toward the header. The header holds
//! the offset of the newest record (the free-space boundary).
//! ```text
//! 0          4                 boundary                          page_size
//! ┌──────────┬─────────────────┬──────────┬──────┬──────────┬──────┐
//! │ boundary │   free space    │ Len (4)  │ Rn   │ Len (4)  │ R1   │
//! │  u32 BE  │                 │  u32 BE  │      │  u32 BE  │      │
//! └──────────┴─────────────────┴──────────┴──────┴──────────┴──────┘
//!                               newest ──────────────────► oldest
//! ```
//! A fresh page stores `page_size` as its boundary.

mod iterator;
mod writer;

pub use iterator::WalIterator;
pub use writer::WalWriter;

/// Log Sequence Number. Starts at 1 for the first append of a writer.
pub type Lsn = u64;
