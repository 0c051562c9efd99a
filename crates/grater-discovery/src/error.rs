//! Error types for discovery and scoring.

use grater_core::PoolError;
use thiserror::Error;

/// Fatal failures of a ranking pass.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The importer page could not be fetched
    #[error("failed to fetch importers from {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The importer page answered with a non-success status
    #[error("importer page {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The importer page could not be parsed
    #[error("failed to parse importer page: {0}")]
    Parse(String),

    /// An HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// No library identifier was given and none could be derived from git
    #[error("repository not provided and origin lookup failed: {0}")]
    OriginLookup(String),

    /// A scoring worker died before the queue drained
    #[error("scoring pool failed: {0}")]
    WorkerPool(#[from] PoolError),
}

/// Per-candidate scoring failure. Never fatal; the candidate scores 0.0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreFetchError {
    /// Not a `host/owner/repo` identifier on the recognized host
    #[error("unsupported project path: {0}")]
    UnsupportedProject(String),

    #[error("scoring request timed out: {0}")]
    Timeout(String),

    #[error("scoring request failed: {0}")]
    Transport(String),

    #[error("scoring API returned HTTP {0}")]
    Status(u16),

    #[error("malformed scoring payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ScoreFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScoreFetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            ScoreFetchError::Decode(err.to_string())
        } else {
            ScoreFetchError::Transport(err.to_string())
        }
    }
}

/// Result alias for discovery operations.
pub type DiscoveryResult<T> = std::result::Result<T, DiscoveryError>;
