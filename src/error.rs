// src/error.rs

//! Errors raised while reading, writing or checking vector files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bf16::FormatError;

/// Failure of a vector file operation.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error("{}:{line}: {source}", path.display())]
    Format {
        path: PathBuf,
        /// 1-based line number of the offending record.
        line: usize,
        #[source]
        source: FormatError,
    },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sample range must contain at least one point")]
    EmptyRange,
    #[error("{inputs} inputs but {outputs} outputs")]
    LengthMismatch { inputs: usize, outputs: usize },
    #[error("tolerance {0} must be finite and non-negative")]
    InvalidTolerance(f32),
    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl VectorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        VectorError::Io {
            path: path.into(),
            source,
        }
    }

    /// The format error and line number, if this is one.
    pub fn format_location(&self) -> Option<(usize, &FormatError)> {
        match self {
            VectorError::Format { line, source, .. } => Some((*line, source)),
            _ => None,
        }
    }
}
