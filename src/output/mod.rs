//! Output module for reporting on a finished sweep
//!
//! This module handles:
//! - The bot flag consistency gate run before any report
//! - Headline statistics and top-N tables
//! - The markdown report and the SQLite record export

mod markdown;
pub mod ranking;
mod sqlite_output;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_report, generate_markdown_report, MarkdownReport};
pub use sqlite_output::{export_records, SqliteExport};
pub use stats::{bot_flag_check, print_statistics, ReportStats};
pub use traits::{OutputError, OutputHandler, OutputResult, ReportContext};

use crate::config::Config;
use crate::store::RecordStore;
use crate::SweepError;

/// Builds the report context for a finished sweep
pub fn report_context(config: &Config, registered_users: Option<u64>) -> Result<ReportContext, SweepError> {
    Ok(ReportContext {
        window: config.window.date_window()?,
        base_url: config.feed.base_url.trim_end_matches('/').to_string(),
        top_n: config.report.top_n,
        last_report_url: config.report.last_report_url.clone(),
        registered_users,
    })
}

/// Output handlers for every destination named in the configuration
pub fn configured_handlers(config: &Config) -> Vec<Box<dyn OutputHandler>> {
    let mut handlers: Vec<Box<dyn OutputHandler>> = Vec::new();
    if let Some(path) = &config.output.summary_path {
        handlers.push(Box::new(MarkdownReport::new(path)));
    }
    if let Some(path) = &config.output.database_path {
        handlers.push(Box::new(SqliteExport::new(path)));
    }
    handlers
}

/// Checks the store and writes it to every configured destination
///
/// The bot flag check runs first; a failing check aborts before anything is
/// written.
pub fn write_outputs(
    store: &RecordStore,
    config: &Config,
    ctx: &ReportContext,
) -> Result<usize, SweepError> {
    bot_flag_check(store, &config.report.ignored_set())?;

    let handlers = configured_handlers(config);
    for handler in &handlers {
        tracing::info!("Writing {}", handler.name());
        handler.write(store, ctx)?;
    }
    Ok(handlers.len())
}
