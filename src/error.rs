use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads a document, flattens it, or writes the result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Raised when the document is not well-formed XML.
    #[error("syntax error: {message}")]
    Syntax { message: String },

    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when an existing workbook cannot be carried over.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when an export is requested before any table was loaded.
    #[error("no table has been loaded")]
    NoTable,

    /// Raised when a column projection names a column the table lacks.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Stable classification of a [`ToolError`], for callers that need to react
/// differently to malformed documents and busy destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document could not be tokenized or parsed as XML.
    Syntax,
    /// Reading or writing a file failed.
    Io(IoFailure),
    /// Anything else.
    Unclassified,
}

/// Sub-kind of an IO failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoFailure {
    /// The file is locked or otherwise held by another process.
    ResourceBusy,
    /// Any other IO failure.
    Other,
}

impl ToolError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::Syntax { .. } => ErrorKind::Syntax,
            ToolError::Io(err) => ErrorKind::Io(classify_io(err)),
            ToolError::MissingInput(_) => ErrorKind::Io(IoFailure::Other),
            ToolError::ExcelWrite(rust_xlsxwriter::XlsxError::IoError(err)) => {
                ErrorKind::Io(classify_io(err))
            }
            ToolError::ExcelRead(calamine::XlsxError::Io(err)) => ErrorKind::Io(classify_io(err)),
            _ => ErrorKind::Unclassified,
        }
    }

    /// Returns `true` when the error is a malformed-document failure.
    pub fn is_syntax(&self) -> bool {
        self.kind() == ErrorKind::Syntax
    }

    /// Returns `true` when the target file is held by another process.
    pub fn is_resource_busy(&self) -> bool {
        self.kind() == ErrorKind::Io(IoFailure::ResourceBusy)
    }
}

fn classify_io(err: &io::Error) -> IoFailure {
    match err.kind() {
        io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy => IoFailure::ResourceBusy,
        _ => IoFailure::Other,
    }
}
