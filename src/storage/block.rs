//! Block
//!
//! Address of one page-sized slice of a file.

use std::fmt;

/// A disk block identified by file name and logical block number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    filename: String,
    block_num: u64,
}

impl Block {
    pub fn new(filename: impl Into<String>, block_num: u64) -> Self {
        Self {
            filename: filename.into(),
            block_num,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// 0-based block index within the file
    pub fn block_num(&self) -> u64 {
        self.block_num
    }

    /// Stable key combining file and block number ("f:<file>:<num>")
    pub fn id(&self) -> String {
        format!("f:{}:{}", self.filename, self.block_num)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {:?} block {}", self.filename, self.block_num)
    }
}
