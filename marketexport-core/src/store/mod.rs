//! JSON document store for the exported tree.
//!
//! The store itself only moves bytes at relative paths; [`layout`] decides
//! where each file lives and [`policy`] implements the append and replace
//! update rules on top of any [`DocumentStore`].

pub mod disk;
pub mod layout;
pub mod memory;
pub mod policy;
pub mod records;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use disk::JsonFileStore;
pub use memory::MemoryStore;
pub use policy::{
    append_price_point, append_price_points, read_json, read_listed_companies,
    read_price_series, replace_section, write_json, AppendOutcome,
};
pub use records::{load_exchange_record, load_stock_record};

/// Local file failure: unreadable, unwritable, or not the expected structure.
///
/// Like fetch failures, these are caught per entity and never abort a run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to serialize {}: {reason}", path.display())]
    Serialize { path: PathBuf, reason: String },
}

impl StoreError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            StoreError::Io { path, .. }
            | StoreError::Malformed { path, .. }
            | StoreError::Serialize { path, .. } => path,
        }
    }
}

/// Byte-level access to documents at paths relative to the store root.
///
/// Implementations are not transactional. Two processes writing the same tree
/// concurrently is unsupported.
pub trait DocumentStore: Send + Sync {
    /// Contents of `path`, or `None` if it does not exist.
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the contents of `path`, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError>;

    /// File names directly under `dir`, sorted. Empty if `dir` does not exist.
    fn list(&self, dir: &Path) -> Result<Vec<String>, StoreError>;
}
