use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Error type covering the different failure cases that can occur while
/// collecting CSV files into a workbook.
///
/// Per-file variants ([`Parse`](Self::Parse), [`Encoding`](Self::Encoding),
/// [`DuplicateSheetName`](Self::DuplicateSheetName),
/// [`SheetWrite`](Self::SheetWrite)) only abort a run when the data source is a
/// single file. Everything else is fatal.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Raised when the command line input cannot be used as given.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Raised when the data source path does not exist.
    #[error("data source not found: {0}")]
    SourceNotFound(PathBuf),

    /// Raised when the data source exists but cannot be read as a file or
    /// listed as a directory.
    #[error("data source {path} is not readable: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// Raised when a CSV file cannot be opened, read, or parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Raised when a CSV file contains bytes that are not valid UTF-8.
    #[error("{path} is not valid UTF-8 (record {record})")]
    Encoding { path: PathBuf, record: u64 },

    /// Raised when two input files resolve to the same sheet name.
    #[error("sheet name '{name}' derived from {path} is already in use")]
    DuplicateSheetName { name: String, path: PathBuf },

    /// Raised when CSV content cannot be placed in a worksheet, e.g. because it
    /// exceeds the row, column, or cell length limits of the format.
    #[error("failed to write sheet for {path}: {source}")]
    SheetWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// Raised when the workbook cannot be serialized or written to disk.
    #[error("failed to write workbook {path}: {reason}")]
    OutputWrite { path: PathBuf, reason: String },

    /// Wrapper for IO failures outside of the conversion itself.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the conversion report cannot be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ConversionError {
    /// Builds the error for a CSV reader failure, separating decoding problems
    /// from structural ones.
    pub(crate) fn from_csv(path: PathBuf, error: csv::Error) -> Self {
        if let csv::ErrorKind::Utf8 { pos, .. } = error.kind() {
            let record = pos.as_ref().map_or(0, |pos| pos.record() + 1);
            return ConversionError::Encoding { path, record };
        }
        ConversionError::Parse {
            path,
            source: error,
        }
    }
}
