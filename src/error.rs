//! Error types for loading, reconciling and reshaping the datasets.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// External source unreachable, or its page lacks the expected structure.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Cache file exists but cannot be understood.
    #[error("Malformed cache file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Entity name has no code in the reference table.
    #[error("No country code was found for {entity}")]
    NotFound { entity: String },

    /// Pivot would have to place two values in the same cell.
    #[error("Duplicate value for ({key}, {category}) while pivoting")]
    DataIntegrity { key: String, category: String },

    #[error("Invalid alias {from} -> {to}: {reason}")]
    InvalidAlias {
        from: String,
        to: String,
        reason: &'static str,
    },

    #[error("Invalid configuration {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("Failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
