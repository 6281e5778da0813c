use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for Ferrite operations
///
/// This enum represents all possible error types that can occur during Ferrite database
/// operations. Each error kind describes a specific category of failure, enabling precise
/// error handling.
///
/// # Examples
///
/// ```rust,ignore
/// use ferrite::errors::{FerriteError, ErrorKind, FerriteResult};
///
/// fn example() -> FerriteResult<()> {
///     Err(FerriteError::new("Unknown comparison operator", ErrorKind::FilterError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Filter Errors - actively used in query compilation
    /// Error during query compilation or filter evaluation
    FilterError,

    // Indexing Errors - actively used in index operations
    /// Generic indexing error
    IndexingError,

    // Operation Errors - actively used for invalid/unsupported operations
    /// The operation is not valid in the current context
    InvalidOperation,

    // IO and Storage Errors - actively used in snapshot persistence
    /// Generic IO error
    IOError,
    /// The snapshot file was not found
    FileNotFound,
    /// Permission denied for file operation
    PermissionDenied,
    /// Snapshot data is corrupted
    FileCorrupted,

    // Data Encoding Errors - actively used by the snapshot codecs
    /// Error encoding or decoding snapshot data
    EncodingError,

    // Generic/Internal Errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::IndexingError => write!(f, "Indexing error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::FileNotFound => write!(f, "File not found"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::FileCorrupted => write!(f, "File corrupted"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom Ferrite error type.
///
/// `FerriteError` encapsulates error information including the error message, kind, and
/// optional cause. It supports error chaining and backtraces for debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use ferrite::errors::{FerriteError, ErrorKind};
///
/// // Create a simple error
/// let err = FerriteError::new("Unknown comparison operator", ErrorKind::FilterError);
///
/// // Create an error with a cause
/// let cause = FerriteError::new("IO failed", ErrorKind::IOError);
/// let err = FerriteError::new_with_cause("Snapshot load failed", ErrorKind::FileCorrupted, cause);
/// ```
///
/// # Type alias
///
/// The `FerriteResult<T>` type alias is equivalent to `Result<T, FerriteError>` and is used
/// throughout the codebase for operations that can fail.
#[derive(Clone)]
pub struct FerriteError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<FerriteError>>,
    backtrace: Backtrace,
}

impl FerriteError {
    /// Creates a new `FerriteError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    ///
    /// # Returns
    ///
    /// A new `FerriteError` instance.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        FerriteError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Backtrace::new_unresolved(),
        }
    }

    /// Creates a new `FerriteError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for debugging.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    ///
    /// # Returns
    ///
    /// A new `FerriteError` instance with the cause error attached.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: FerriteError) -> Self {
        FerriteError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Backtrace::new_unresolved(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&FerriteError> {
        self.cause.as_deref()
    }
}

impl Display for FerriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for FerriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = self.backtrace.clone();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, backtrace)
            }
        }
    }
}

impl Error for FerriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Ferrite operations.
///
/// `FerriteResult<T>` is shorthand for `Result<T, FerriteError>`.
/// All fallible Ferrite operations return this type.
pub type FerriteResult<T> = Result<T, FerriteError>;

// From trait implementations for automatic error conversion
impl From<std::io::Error> for FerriteError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::UnexpectedEof => ErrorKind::FileCorrupted,
            _ => ErrorKind::IOError,
        };
        FerriteError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<serde_json::Error> for FerriteError {
    fn from(err: serde_json::Error) -> Self {
        FerriteError::new(
            &format!("JSON encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<rmp_serde::encode::Error> for FerriteError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        FerriteError::new(
            &format!("MessagePack encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<rmp_serde::decode::Error> for FerriteError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        FerriteError::new(
            &format!("MessagePack decoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<String> for FerriteError {
    fn from(msg: String) -> Self {
        FerriteError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for FerriteError {
    fn from(msg: &str) -> Self {
        FerriteError::new(msg, ErrorKind::InternalError)
    }
}
