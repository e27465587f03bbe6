//! Shared error type across ccusage crates.

use thiserror::Error;

/// Stable error codes, used as metric labels and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing configuration.
    Config,
    /// Transport failure (connect, timeout, TLS).
    Http,
    /// Upstream answered with a non-2xx status.
    Status,
    /// Upstream body could not be decoded.
    Decode,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in labels and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::Http => "HTTP",
            ErrorKind::Status => "STATUS",
            ErrorKind::Decode => "DECODE",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("config: {0}")]
    Config(String),
    #[error("http: {0}")]
    Http(String),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("decode: {0}")]
    Decode(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ExporterError {
    /// Map the error to its stable code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExporterError::Config(_) => ErrorKind::Config,
            ExporterError::Http(_) => ErrorKind::Http,
            ExporterError::Status(_) => ErrorKind::Status,
            ExporterError::Decode(_) => ErrorKind::Decode,
            ExporterError::Internal(_) => ErrorKind::Internal,
        }
    }
}
