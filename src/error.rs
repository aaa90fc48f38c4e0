//! Error types for watch_stock_sync

use thiserror::Error;

/// Unified error type for feed, marketplace and configuration failures
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level failure (DNS, refused connection, timeout)
    #[error("Connection error: {0}")]
    Connectivity(#[source] reqwest::Error),
    /// Remote API answered with a non-success status
    #[error("Remote error: HTTP {status}: {body}")]
    Remote {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Remote API answered 2xx but the body could not be decoded
    #[error("Malformed response: {0}")]
    Response(#[source] reqwest::Error),
    /// Supplier archive could not be opened
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// Supplier spreadsheet could not be read
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsError),
    /// Supplier feed is readable but not in the expected shape
    #[error("Supplier feed error: {0}")]
    Feed(String),
    /// Local file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// True for failures reported by the remote API itself
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Remote { .. } | SyncError::Response(_))
    }

    /// True for failures reaching the remote API at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, SyncError::Connectivity(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Response(err)
        } else {
            SyncError::Connectivity(err)
        }
    }
}

/// Result alias for watch_stock_sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
