//! Discuit-Sweep: a window-bounded harvester for activity-sorted feeds
//!
//! This crate walks a live, cursor-paginated activity feed and collects every
//! post and comment that falls inside a configured date window. Because the
//! feed is reordered while it is being read (a new comment bumps its post to
//! the top), a single forward pass is followed by a rescan that re-walks the
//! top of the feed until its leading item stops changing.

pub mod config;
pub mod crawler;
pub mod feed;
pub mod output;
pub mod store;
pub mod window;

use thiserror::Error;

/// Main error type for Discuit-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Feed cursor is not a numeric ordering value: {0:?}")]
    MalformedCursor(String),

    #[error("Data consistency error: {0}")]
    DataConsistency(String),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

impl SweepError {
    /// Returns true for failures of the remote feed (request, status, payload)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Status { .. } | Self::Decode { .. } | Self::MalformedCursor(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid date in config: {0}")]
    InvalidDate(String),
}

/// Result type alias for Discuit-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Harvester, SweepOutcome};
pub use feed::{Comment, DiscuitClient, FeedSource, PostSummary};
pub use store::{Record, RecordKey, RecordStore};
pub use window::{DateBucket, DateWindow};
