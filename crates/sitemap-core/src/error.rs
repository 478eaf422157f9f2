//! Error types and handling for sitemap-core operations.
//!
//! All public functions in this crate return [`Result<T>`] with a single
//! [`Error`] enum covering the four failure classes of sitemap generation:
//!
//! - **Validation**: a URL entry field is out of range or malformed
//! - **Configuration**: the writer was constructed with invalid options
//! - **Invalid record**: the input sequence produced something that is not
//!   a usable URL entry
//! - **I/O**: directory creation or file writing failed
//!
//! Nothing is caught or retried internally; every error propagates to the
//! caller of the failing operation. A failure partway through generation
//! leaves already-flushed sitemap files on disk without an index file, and
//! cleanup is the caller's responsibility.

use thiserror::Error;

/// The main error type for sitemap-core operations.
///
/// `Display` provides user-friendly messages; the underlying
/// `std::io::Error` is preserved for I/O failures so the full source chain
/// stays inspectable.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers creating the target directory, opening sitemap files, and
    /// writing or flushing XML content (permissions, disk full, invalid
    /// path).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A URL entry field failed validation.
    ///
    /// Raised synchronously when constructing or mutating an entry with an
    /// out-of-range field: location too long, unknown change-frequency
    /// token, priority outside `[0.0, 1.0]`.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The writer configuration is invalid.
    ///
    /// Raised at writer construction for an empty target directory, or
    /// during deserialization when the configuration carries an
    /// unrecognized key.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An element pulled from the input sequence is not a usable URL entry.
    ///
    /// Producers that hand the writer a fallible sequence report per-item
    /// failures through this variant. Generation aborts immediately; no
    /// index file is written for the sitemap files completed so far.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl Error {
    /// Get the error category as a static string identifier.
    ///
    /// Useful for grouping errors in logs without matching on the full
    /// variant.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Validation(_) => "validation",
            Self::Config(_) => "config",
            Self::InvalidRecord(_) => "invalid_record",
        }
    }
}

/// Convenient result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::Validation("priority 1.5 out of range".to_string());
        assert_eq!(err.to_string(), "Validation error: priority 1.5 out of range");

        let err = Error::Config("targetDirectory must not be empty".to_string());
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_io_conversion_preserves_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert_eq!(err.category(), "io");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_categories() {
        assert_eq!(Error::Validation(String::new()).category(), "validation");
        assert_eq!(Error::InvalidRecord(String::new()).category(), "invalid_record");
        assert_eq!(Error::Config(String::new()).category(), "config");
    }
}
