//! Error types for splitting operations.
//!
//! Every variant is fatal: the split stops at the first failure and whatever
//! was already flushed to disk is left in place.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("cannot open input file {path}: {source}")]
    InputOpen { path: PathBuf, source: io::Error },

    #[error("reading input: {0}")]
    InputRead(#[source] io::Error),

    #[error("cannot create {path}: {source}")]
    OutputCreate { path: PathBuf, source: io::Error },

    #[error("writing {path}: {source}")]
    OutputWrite { path: PathBuf, source: io::Error },

    #[error("finalizing {path}: {source}")]
    OutputFinalize { path: PathBuf, source: io::Error },

    #[error("copying common buffer to {path}: {source}")]
    FallbackPromotion { path: PathBuf, source: io::Error },
}

impl SplitError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Result type for splitting operations
pub type Result<T> = std::result::Result<T, SplitError>;
