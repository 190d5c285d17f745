//! Centralized error types for mboxzip2json.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mboxzip2json library.
///
/// Any of these aborts the whole extraction; there is no partial result.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified archive does not exist.
    #[error("archive not found: {0}")]
    FileNotFound(PathBuf),

    /// The zip structure of a (possibly nested) archive could not be decoded.
    #[error("reading zip archive '{path}': {source}")]
    Archive {
        path: String,
        source: zip::result::ZipError,
    },

    /// A nested archive is larger than the configured cap.
    #[error("nested archive '{path}' exceeds the size limit of {limit} bytes")]
    NestedTooLarge { path: String, limit: u64 },

    /// The mailbox stream does not follow the `From ` framing convention.
    #[error("invalid mbox format at line {line}: {reason}")]
    InvalidMbox { line: u64, reason: String },

    /// A header line inside a message could not be parsed.
    #[error("malformed header line {line}: {content:?}")]
    MalformedHeader { line: u64, content: String },

    /// The `Date` header matched none of the accepted layouts.
    #[error("reading Date header {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },

    /// Failure while processing one archive entry, with its full nested path.
    #[error("processing file {path}: {source}")]
    Entry {
        path: String,
        source: Box<ExtractError>,
    },
}

/// Convenience alias for `Result<T, ExtractError>`.
pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `Archive` variant for the archive at `path`.
    pub fn archive(path: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }

    /// Wrap an error with the display path of the entry being processed.
    pub fn in_entry(path: impl Into<String>, source: ExtractError) -> Self {
        Self::Entry {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
