//! Error types for the ACH writer library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building and rendering an ACH file.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value violates its field constraint.
    #[error("Invalid {field}, {reason}: {value}")]
    Validation {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A value does not fit its fixed column width.
    #[error("{field} value {value} does not fit in {width} columns")]
    Format {
        field: &'static str,
        value: String,
        width: usize,
    },

    /// A batch was rendered without any entries.
    #[error("Batch {batch_number} has no entries")]
    EmptyBatch { batch_number: u32 },

    /// A file was rendered without any entries in any batch.
    #[error("File has no batch containing an entry")]
    EmptyFile,

    /// Calendar input could not be interpreted as an instant.
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing CSV input.
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Invalid amount format.
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),
}

impl Error {
    pub(crate) fn validation(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Validation {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
