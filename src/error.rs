//! Error types for forum-pathfinder.
//!
//! Classifiers never fail: an undiscoverable field is `None`. The variants
//! below cover configuration, I/O against external collaborators, and the
//! discovery pipeline stopping before a profile could be written.

use crate::fetch::FetchError;

/// Error type for discovery and harvesting operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Config file could not be read or written.
    #[error("Config file error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Config file is not valid JSON for the expected schema.
    #[error("Config file is invalid: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    /// Config file parsed but holds unusable values.
    #[error("Config file has invalid values: {0}")]
    ConfigInvalid(String),

    /// A page could not be fetched.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The repository rejected an operation.
    #[error("Repository error: {0}")]
    Repository(String),

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No thread-listing container was found in the sample pages.
    #[error("No thread table found in the sample pages")]
    NoTableFound,

    /// A thread table was found but no row-relative thread link path.
    #[error("No thread links found inside the thread table")]
    NoThreadLinksFound,

    /// None of the discovered thread links produced a usable thread page.
    #[error("No thread pages could be sampled")]
    NoThreadSamples,

    /// The operator abandoned the run after a fetch failure.
    #[error("Discovery aborted by the operator")]
    Aborted,
}

/// Result type alias for forum-pathfinder operations.
pub type Result<T> = std::result::Result<T, Error>;
