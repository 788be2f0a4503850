use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to build a [`Document`](crate::Document) from a file or buffer.
///
/// A failed load never hands back a partially built document.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {} for reading", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read data")]
    ReadFailure {
        #[source]
        source: io::Error,
    },
    #[error("line {line}: key/value pair appears before any section header")]
    MissingSection { line: usize },
    #[error("failed to allocate storage for a group or item")]
    Allocation(#[from] TryReserveError),
}

/// Failure to serialize a [`Document`](crate::Document).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to open {} for writing", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write data")]
    WriteFailure {
        #[source]
        source: io::Error,
    },
}

/// Failure of one of the typed setters.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to allocate storage for a group or item")]
    Allocation(#[from] TryReserveError),
}
