use std::error::Error as StdError;
use std::fmt;

use crate::path::FsPath;

/* 📖 # Why a custom error type and not anyhow/eyre/thiserror etc?

- Better control over error handling
- No dependencies to compile and integrate
- More transparency into error handling logic
 */

/// Error variants that can occur in fskit operations.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// A filesystem call failed for a reason other than "not found".
    FileError {
        path: FsPath,
        source: std::io::Error,
    },

    /// An operation was invoked on a path of the wrong kind,
    /// e.g. a file copy on a directory.
    Precondition { message: String },

    /// Multiple errors occurred during a batch operation such as a
    /// recursive directory copy. Individual successes are retained.
    Multiple { errors: Vec<FsError>, count: usize },

    /// Catch-all for other errors with a message
    Message { message: String },
}

/* 📖 # Why separate ErrorKind and FsError?
This two-layer design provides a clear separation of concerns:
- ErrorKind: structural variants with specific contexts (paths, sources, ...)
- FsError: wraps ErrorKind with additional runtime context strings

Benefits:
- Users can pattern match on ErrorKind for specific handling
- FsError provides ergonomic context attachment for propagation
- Avoids nested context strings (which get expensive with many layers)
*/

/// Comprehensive error type wrapping ErrorKind with optional context.
/// FsError implements the standard Error trait and supports context attachment.
#[derive(Debug)]
pub struct FsError {
    kind: ErrorKind,
    context: Vec<String>,
}

impl FsError {
    /// Creates a new error from an ErrorKind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
        }
    }

    /// Creates a catch-all message error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Creates a precondition-violation error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition {
            message: message.into(),
        })
    }

    /// Creates a filesystem error for the given path.
    pub fn file(path: &FsPath, source: std::io::Error) -> Self {
        Self::new(ErrorKind::FileError {
            path: path.clone(),
            source,
        })
    }

    /// Attaches context to an error.
    /// Context is displayed before the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    /// Useful to avoid expensive string construction for successful paths.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    /// Allows pattern matching on specific error variants.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the innermost error in the chain.
    /// Traverses the error source chain to find the root cause.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

impl From<ErrorKind> for FsError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for FsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::Multiple { errors, .. } => errors.first().and_then(|e| e.source()),
            ErrorKind::Precondition { .. } | ErrorKind::Message { .. } => None,
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display context first if present
        for (i, ctx) in self.context.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", ctx)?;
            } else {
                write!(f, ": {}", ctx)?;
            }
        }

        // Add a separator if we have context
        if !self.context.is_empty() {
            write!(f, ": ")?;
        }

        // Display the underlying error kind
        match &self.kind {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path, source)
            }
            ErrorKind::Precondition { message } => {
                write!(f, "Precondition violated: {}", message)
            }
            ErrorKind::Multiple { errors, count } => {
                write!(
                    f,
                    "Multiple errors occurred ({} total): {}",
                    count,
                    errors.first().unwrap_or(self)
                )
            }
            ErrorKind::Message { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

/* 📖 # Why use Box<FsError> in the result type?

Boxing the error reduces the size of the result type, making it more efficient
to return in the common case.

*/

/// Standard result type for fskit_core operations.
pub type FsResult<T> = std::result::Result<T, Box<FsError>>;

/// Constructs a boxed `FsError` with a formatted message.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::error::FsError::message(format!($($arg)*)))
    };
}

/* 📖 # Why provide ResultExt for context attachment?
The ResultExt trait provides ergonomic methods to add context to errors during
propagation. Using `.context("message")` is more readable than manually mapping
and wrapping errors. This pattern is common in error-handling libraries
(e.g., anyhow, eyre).
*/

/// Extension trait for attaching context to Results.
/// Provides ergonomic error context attachment during error propagation.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    /// Eager evaluation: context is evaluated immediately.
    fn context(self, context: impl Into<String>) -> FsResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    /// Prefer this to avoid expensive string formatting in the success path.
    fn with_context<F>(self, f: F) -> FsResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for FsResult<T> {
    fn context(self, context: impl Into<String>) -> FsResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> FsResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}
