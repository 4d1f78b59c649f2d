//! Error types for the public surface of the library.
//!
//! Internally, functions return `Res<T>`, which is an `anyhow::Result`, and attach context as the
//! error travels upward. At the public boundary the error is tagged with an `ErrorType` using
//! `IntoResult::pub_result` so that callers can decide how to react without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of what went wrong.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A file that was expected to exist does not. Usually handled by creating it.
    NotFound,
    /// A file exists but cannot be read as a table.
    CorruptFormat,
    /// Reading or writing a file failed.
    Io,
    /// User input was rejected, e.g. a month of 13.
    Validation,
    /// The configuration file or home directory is missing or malformed.
    Config,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// The public error type: an `ErrorType` plus the full `anyhow` chain.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Creates a `Validation` error from a message.
    pub fn validation(message: impl Display) -> Self {
        Self::new(ErrorType::Validation, anyhow::anyhow!("{message}"))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts an internal result into a public one by tagging the error with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_context() {
        let res: Res<()> = Err(anyhow::anyhow!("disk full")).context("Unable to save sales");
        let err = res.pub_result(ErrorType::Io).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Io);
        let message = err.to_string();
        assert!(message.contains("Unable to save sales"));
        assert!(message.contains("disk full"));
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::NotFound.to_string(), "not_found");
        assert_eq!(ErrorType::CorruptFormat.to_string(), "corrupt_format");
    }

    #[test]
    fn test_validation() {
        let err = Error::validation("Month must be between 1 and 12, got 13");
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(err.to_string(), "Month must be between 1 and 12, got 13");
    }
}
