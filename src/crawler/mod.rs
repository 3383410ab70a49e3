//! Crawl phases over the activity feed
//!
//! This module contains the sweep itself:
//! - The forward pass down to the window's lower bound
//! - The rescan that detects posts bumped during the forward pass
//! - The batched redo pass over those posts
//! - The [`Harvester`] that runs the three in order

mod coordinator;
mod forward;
mod redo;
mod rescan;
#[cfg(test)]
mod test_feed;
mod throttle;

pub use coordinator::{Harvester, SweepOutcome};
pub use forward::{forward_crawl, process_posts, BatchOutcome, ForwardOutcome, PassKind};
pub use redo::{process_redo_posts, RedoOutcome};
pub use rescan::{collect_redo_posts, LeadItem, RedoSet, RescanOutcome};
pub use throttle::Throttle;

use crate::config::Config;
use crate::window::DateWindow;
use crate::ConfigError;
use std::collections::HashSet;

/// Settings shared by every crawl phase
#[derive(Debug, Clone)]
pub struct CrawlContext {
    pub window: DateWindow,
    pub ignored_users: HashSet<String>,
    pub throttle: Throttle,
    pub redo_batch_size: usize,
    pub max_rescan_iterations: u32,
}

impl CrawlContext {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            window: config.window.date_window()?,
            ignored_users: config.report.ignored_set(),
            throttle: Throttle::new(config.crawler.request_delay()),
            redo_batch_size: config.crawler.redo_batch_size,
            max_rescan_iterations: config.crawler.max_rescan_iterations,
        })
    }

    /// A context with no delay and default batch settings
    pub fn for_window(window: DateWindow) -> Self {
        let defaults = crate::config::CrawlerConfig::default();
        Self {
            window,
            ignored_users: HashSet::new(),
            throttle: Throttle::none(),
            redo_batch_size: defaults.redo_batch_size,
            max_rescan_iterations: defaults.max_rescan_iterations,
        }
    }
}
