//! Error types shared by the raster, output and download layers.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// A daily input file is absent.
    #[error("missing input `{}` for {date}", path.display())]
    MissingInput { path: PathBuf, date: NaiveDate },

    /// The file exists but lacks the expected dimensions or variables.
    #[error("malformed input `{}`: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("grid mismatch: expected {expected:?}, found {found:?}")]
    GridMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Errors that only invalidate the current date; the run carries on without it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingInput { .. }
                | PipelineError::MalformedInput { .. }
                | PipelineError::GridMismatch { .. }
                | PipelineError::Http { .. }
                | PipelineError::Request(_)
        )
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// -- Tests -------------------------------------------------------------------
