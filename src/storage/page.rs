//! Page
//!
//! A fixed-size in-memory buffer with typed accessors.
//!
//! ## Encoding
//! - Integer: 4 bytes, big-endian, unsigned
//! - Bytes:   4-byte big-endian length prefix + raw bytes
//! - String:  UTF-8 bytes stored with the byte encoding
//!
//! Every accessor checks its full byte span against the capacity before
//! touching the buffer, so a rejected write leaves the page unchanged.

use crate::error::{PageLogError, Result};

/// Width of an encoded integer (and of every length prefix)
pub const INT_SIZE: usize = 4;

/// Reference page size (8 KB)
pub const PAGE_SIZE_8K: usize = 8 * 1024;

/// A database page backed by a fixed-size buffer
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    buf: Vec<u8>,
}

impl Page {
    /// Create an all-zero page of `page_size` bytes
    pub fn new(page_size: usize) -> Self {
        Self {
            buf: vec![0u8; page_size],
        }
    }

    /// Hydrate a page from an existing buffer; its length is the capacity
    pub fn from_buf(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    /// Total size of the page in bytes
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Worst-case encoded size of an `n`-character string (4 bytes per char)
    pub fn max_str_len(n: usize) -> usize {
        INT_SIZE + n * 4
    }

    /// Read a big-endian u32 at `offset`
    pub fn get_int(&self, offset: usize) -> Result<u32> {
        let range = self.span(offset, INT_SIZE)?;
        let mut raw = [0u8; INT_SIZE];
        raw.copy_from_slice(&self.buf[range]);
        Ok(u32::from_be_bytes(raw))
    }

    /// Write a big-endian u32 at `offset`
    pub fn set_int(&mut self, offset: usize, value: u32) -> Result<()> {
        let range = self.span(offset, INT_SIZE)?;
        self.buf[range].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Read a length-prefixed byte array at `offset`
    ///
    /// The returned slice borrows the page buffer.
    pub fn get_bytes(&self, offset: usize) -> Result<&[u8]> {
        let len = self.get_int(offset)? as usize;
        let start = offset + INT_SIZE;
        let range = self.span(start, len)?;
        Ok(&self.buf[range])
    }

    /// Write `data` with its length prefix at `offset`
    ///
    /// The whole span (prefix + payload) is checked before anything is written.
    pub fn set_bytes(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let total = INT_SIZE + data.len();
        self.span(offset, total)?;

        // A payload that fits the page always fits the u32 prefix
        let len = u32::try_from(data.len()).map_err(|_| PageLogError::OutOfBounds {
            offset,
            len: total,
            capacity: self.capacity(),
        })?;

        let start = offset + INT_SIZE;
        self.buf[offset..start].copy_from_slice(&len.to_be_bytes());
        self.buf[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Read a UTF-8 string stored with the byte encoding
    pub fn get_string(&self, offset: usize) -> Result<String> {
        let raw = self.get_bytes(offset)?;
        String::from_utf8(raw.to_vec()).map_err(|e| {
            PageLogError::Corruption(format!("invalid UTF-8 string at offset {}: {}", offset, e))
        })
    }

    /// Write a string as its UTF-8 bytes
    pub fn set_string(&mut self, offset: usize, value: &str) -> Result<()> {
        self.set_bytes(offset, value.as_bytes())
    }

    /// Full backing buffer, for whole-page I/O
    pub fn contents(&self) -> &[u8] {
        &self.buf
    }

    /// Mutable view of the full backing buffer, for whole-page I/O
    pub fn contents_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Validate `[offset, offset + len)` against the capacity
    fn span(&self, offset: usize, len: usize) -> Result<std::ops::Range<usize>> {
        match offset.checked_add(len) {
            Some(end) if end <= self.buf.len() => Ok(offset..end),
            _ => Err(PageLogError::OutOfBounds {
                offset,
                len,
                capacity: self.buf.len(),
            }),
        }
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Dumping 8 KB of bytes helps nobody
        f.debug_struct("Page")
            .field("capacity", &self.buf.len())
            .field("header", &self.get_int(0).ok())
            .finish()
    }
}
