//! Loader Errors
//!
//! Failure taxonomy for reading vector tables from disk.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;

/// Errors raised while loading a vector table.
///
/// Every variant is fatal for the load: no partially populated table is
/// ever returned alongside one of these.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Word vector file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid vector dimension: {0} (must be greater than 0)")]
    InvalidDimension(usize),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Text record that does not hold a word followed by `D` floats
    #[error("Malformed record {record}: {reason}")]
    MalformedRecord { record: usize, reason: String },

    /// Binary record whose byte shape is invalid
    #[error("Corrupt record {record}: {reason}")]
    CorruptRecord { record: usize, reason: String },

    #[error("Truncated file: header declares {expected} records, found {found}")]
    TruncatedFile { expected: usize, found: usize },

    #[error("Duplicate word '{word}' at record {record}")]
    DuplicateWord { word: String, record: usize },
}

impl LoadError {
    /// Map an open failure, keeping "not found" distinct from other I/O errors
    pub(crate) fn open(path: PathBuf, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            LoadError::FileNotFound(path)
        } else {
            LoadError::Io(err)
        }
    }
}
