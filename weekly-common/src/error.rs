//! Common error types for the weekly playlist workspace

use thiserror::Error;

/// Common result type for weekly playlist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the library and the sync service
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog asked us to slow down. Retried transparently by the resolver.
    #[error("Rate limited by catalog")]
    RateLimited,

    /// Catalog search failed for a reason other than rate limiting
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// Fetching upstream data (tracklists, events, playlist tracks) failed
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// Adding, removing or creating on a remote playlist failed
    #[error("Playlist update failed: {0}")]
    CollectionUpdate(String),

    /// Sampling asked for more members than the set holds
    #[error("Not enough members to sample: requested {requested}, available {available}")]
    InsufficientMembers { requested: usize, available: usize },

    /// A window fetch failed and the convergence loop stopped
    #[error("Convergence aborted: {0}")]
    ConvergenceAborted(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the one error class the catalog search retries on
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited)
    }
}
