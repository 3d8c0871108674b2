//! File Manager
//!
//! File-backed block storage.
//!
//! ## Responsibilities
//! - Bootstrap the data directory (and its `wal/` subdirectory)
//! - Remove stale temp files left behind by a previous run
//! - Cache open file handles
//! - Read and write whole pages at block offsets

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{PageLogError, Result};

use super::{Block, BlockStorage, Page};

/// Name prefix of temporary table files, removed on open
pub const TMP_FILE_PREFIX: &str = "__tmp_";

/// Subdirectory holding WAL files
pub const WAL_DIR: &str = "wal";

/// Reads and writes pages to disk blocks
///
/// ## Concurrency:
/// - `open_files`: Protected by Mutex; every block read/write holds it, so
///   operations on the same block never interleave
/// - All methods use `&self`
pub struct FileManager {
    /// Root directory for all files
    dir: PathBuf,

    /// Fixed page size for every file
    page_size: usize,

    /// Whether the directory was created by this manager
    is_new: bool,

    /// Open handles keyed by file name (relative to `dir`)
    open_files: Mutex<HashMap<String, File>>,
}

impl FileManager {
    /// Open or create a data directory
    ///
    /// On startup:
    /// 1. Create the directory if it doesn't exist
    /// 2. Make sure the WAL subdirectory exists
    /// 3. Remove leftover temp files
    pub fn new(dir: impl AsRef<Path>, page_size: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        let is_new = match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => false,
            Ok(_) => {
                return Err(PageLogError::Config(format!(
                    "{} exists and is not a directory",
                    dir.display()
                )))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(PageLogError::Io(e)),
        };

        if is_new {
            fs::create_dir_all(&dir)?;
            tracing::info!("Created database directory {}", dir.display());
        }
        fs::create_dir_all(dir.join(WAL_DIR))?;

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();

            if name.to_string_lossy().starts_with(TMP_FILE_PREFIX) {
                let path = entry.path();
                tracing::warn!("Removing stale temp file {}", path.display());
                fs::remove_file(&path)?;
            }
        }

        Ok(Self {
            dir,
            page_size,
            is_new,
            open_files: Mutex::new(HashMap::new()),
        })
    }

    /// Whether the data directory was created on open
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Get the data directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Byte offset of a block in its file
    fn block_offset(&self, block: &Block) -> Result<u64> {
        block
            .block_num()
            .checked_mul(self.page_size as u64)
            .ok_or_else(|| {
                PageLogError::storage(
                    block,
                    io::Error::new(io::ErrorKind::InvalidInput, "block offset overflows u64"),
                )
            })
    }

    fn check_page(&self, page: &Page) -> Result<()> {
        if page.capacity() != self.page_size {
            return Err(PageLogError::Config(format!(
                "page of {} bytes does not match the block size of {}",
                page.capacity(),
                self.page_size
            )));
        }
        Ok(())
    }

    /// Get a cached handle, opening (and creating) the file on first use
    fn get_file<'a>(
        &self,
        files: &'a mut HashMap<String, File>,
        filename: &str,
    ) -> io::Result<&'a mut File> {
        if !files.contains_key(filename) {
            let path = self.dir.join(filename);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)?;

            tracing::trace!("Opened {}", path.display());
            files.insert(filename.to_string(), file);
        }

        files
            .get_mut(filename)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, filename.to_string()))
    }
}

impl BlockStorage for FileManager {
    fn read(&self, block: &Block, page: &mut Page) -> Result<()> {
        self.check_page(page)?;
        let offset = self.block_offset(block)?;

        let mut files = self.open_files.lock();
        let file = self
            .get_file(&mut files, block.filename())
            .map_err(|e| PageLogError::storage(block, e))?;

        read_at(file, offset, page.contents_mut()).map_err(|e| PageLogError::storage(block, e))
    }

    fn write(&self, block: &Block, page: &Page) -> Result<()> {
        self.check_page(page)?;
        let offset = self.block_offset(block)?;

        let mut files = self.open_files.lock();
        let file = self
            .get_file(&mut files, block.filename())
            .map_err(|e| PageLogError::storage(block, e))?;

        write_at(file, offset, page.contents()).map_err(|e| PageLogError::storage(block, e))
    }

    fn file_size_in_blocks(&self, filename: &str) -> Result<u64> {
        let mut files = self.open_files.lock();
        let len = self
            .get_file(&mut files, filename)
            .and_then(|file| file.metadata())
            .map_err(|e| PageLogError::storage(format!("file {:?}", filename), e))?
            .len();

        Ok(len / self.page_size as u64)
    }

    fn page_size(&self) -> usize {
        self.page_size
    }
}

/// Fill `buf` from `offset`, stopping quietly at end-of-file
fn read_at(file: &mut File, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;

    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Write all of `buf` at `offset` and sync it to disk
fn write_at(file: &mut File, offset: u64, buf: &[u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(buf)?;
    file.sync_data()
}
