//! Error types for the zone synchronization system
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zonesync system
#[derive(Error, Debug)]
pub enum Error {
    /// Missing credentials or a malformed record selector
    #[error("Configuration error: {0}")]
    Config(String),

    /// The login flow did not land on the expected page
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Connection-level failure (the only retryable kind)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with an HTTP error status
    #[error("HTTP error: {0}")]
    Http(String),

    /// Zone, record or identifier lookup failed
    #[error("Not found: {0}")]
    NotFound(String),

    /// A lookup matched several records and nothing disambiguates them
    #[error("Ambiguous match: {0}")]
    AmbiguousMatch(String),

    /// The backend accepted the request but did not confirm the zone update
    #[error("Zone update rejected for zone ID {zone_id}")]
    SubmissionRejected {
        /// Backend zone id
        zone_id: u64,
    },

    /// CNAME concatenation went deeper than allowed
    #[error("Record {name} has more than {limit} concatenated CNAME entries")]
    ChainLimitExceeded {
        /// Name the chain started at
        name: String,
        /// Maximum number of hops
        limit: usize,
    },

    /// An expected element was missing from a scraped page
    #[error("Page model error: {0}")]
    PageModel(String),

    /// Zone-file grammar violation (`line:col: message` from the scanner)
    #[error("Zone file error: {0}")]
    ZoneFile(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an ambiguous match error
    pub fn ambiguous(msg: impl Into<String>) -> Self {
        Self::AmbiguousMatch(msg.into())
    }

    /// Create a page model error
    pub fn page_model(msg: impl Into<String>) -> Self {
        Self::PageModel(msg.into())
    }

    /// Create a zone-file error
    pub fn zone_file(msg: impl Into<String>) -> Self {
        Self::ZoneFile(msg.into())
    }

    /// Whether the failed call may be attempted again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
