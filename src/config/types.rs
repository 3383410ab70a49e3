use crate::window::{DateBucket, DateWindow};
use crate::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Main configuration structure for Discuit-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote feed location and query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Site root, e.g. `https://discuit.net`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Restrict the feed to one community
    #[serde(rename = "community-id", default)]
    pub community_id: Option<String>,

    /// Feed sort order; the sweep relies on activity ordering
    #[serde(default = "default_sort")]
    pub sort: String,

    /// Pagination cursor to start the forward pass from (empty = top)
    #[serde(rename = "start-cursor", default)]
    pub start_cursor: String,
}

/// Date window, as `YYYYMMDD` strings. Empty means unbounded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowConfig {
    #[serde(rename = "from-date", default)]
    pub from_date: String,

    #[serde(rename = "to-date", default)]
    pub to_date: String,
}

impl WindowConfig {
    /// Parses both bounds into a [`DateWindow`]
    pub fn date_window(&self) -> Result<DateWindow, ConfigError> {
        let from = parse_bound(&self.from_date, "from-date")?;
        let to = parse_bound(&self.to_date, "to-date")?;
        Ok(DateWindow::new(from, to))
    }
}

fn parse_bound(raw: &str, field: &str) -> Result<Option<DateBucket>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    DateBucket::parse_compact(raw)
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidDate(format!("{} must be YYYYMMDD, got '{}'", field, raw)))
}

/// Crawl pacing and bounds
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Politeness delay between feed pages, rescan pages and redo batches (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Number of bumped posts re-processed between two delays
    #[serde(rename = "redo-batch-size", default = "default_redo_batch_size")]
    pub redo_batch_size: usize,

    /// Upper bound on full top-of-feed rescan sweeps
    #[serde(rename = "max-rescan-iterations", default = "default_max_rescan_iterations")]
    pub max_rescan_iterations: u32,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            redo_batch_size: default_redo_batch_size(),
            max_rescan_iterations: default_max_rescan_iterations(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Display parameters handed to the report
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Summary tables keep rows ranked at or above this cutoff
    #[serde(rename = "top-n", default = "default_top_n")]
    pub top_n: usize,

    /// Usernames flagged as bots
    #[serde(rename = "ignored-users", default)]
    pub ignored_users: Vec<String>,

    /// Link back to the previous report
    #[serde(rename = "last-report-url", default)]
    pub last_report_url: Option<String>,
}

impl ReportConfig {
    pub fn ignored_set(&self) -> HashSet<String> {
        self.ignored_users.iter().cloned().collect()
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            ignored_users: Vec::new(),
            last_report_url: None,
        }
    }
}

/// Output destinations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the markdown report
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,

    /// Path to the SQLite export of collected records
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

fn default_sort() -> String {
    "activity".to_string()
}

fn default_request_delay_ms() -> u64 {
    2000
}

fn default_redo_batch_size() -> usize {
    10
}

fn default_max_rescan_iterations() -> u32 {
    25
}

fn default_top_n() -> usize {
    10
}
