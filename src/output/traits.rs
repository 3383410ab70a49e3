//! Output handler trait and shared report types

use crate::store::RecordStore;
use crate::window::DateWindow;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything a report needs besides the records themselves
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// The window the records were collected for
    pub window: DateWindow,

    /// Site root used to build post, community and user links
    pub base_url: String,

    /// Tables keep rows ranked at or above this cutoff
    pub top_n: usize,

    /// Link to the previous report, if any
    pub last_report_url: Option<String>,

    /// Registered account count at report time
    pub registered_users: Option<u64>,
}

/// A destination for the finished harvest
pub trait OutputHandler {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Writes the report or export for `store`
    fn write(&self, store: &RecordStore, ctx: &ReportContext) -> OutputResult<()>;
}
