//! Sweep coordinator
//!
//! Owns the feed source and the record store and runs the phases in order:
//! forward pass, rescan, redo. The store is only ever written by the forward
//! and redo passes; the rescan reads it to decide what has changed.

use crate::config::Config;
use crate::crawler::forward::{forward_crawl, ForwardOutcome};
use crate::crawler::redo::{process_redo_posts, RedoOutcome};
use crate::crawler::rescan::{collect_redo_posts, RescanOutcome};
use crate::crawler::CrawlContext;
use crate::feed::{DiscuitClient, FeedSource};
use crate::store::RecordStore;
use crate::window::DateWindow;
use crate::SweepError;

/// Summary of a complete sweep
#[derive(Debug)]
pub struct SweepOutcome {
    pub forward: ForwardOutcome,
    pub rescan: RescanOutcome,
    pub redo: RedoOutcome,
}

/// Runs the sweep phases over a feed source
pub struct Harvester<F: FeedSource> {
    config: Config,
    source: F,
    store: RecordStore,
    ctx: CrawlContext,
}

impl Harvester<DiscuitClient> {
    /// Creates a harvester that talks to the configured site over HTTP
    pub fn from_config(config: Config) -> Result<Self, SweepError> {
        let client = DiscuitClient::new(&config.feed, &config.user_agent)?;
        Self::new(config, client)
    }
}

impl<F: FeedSource> Harvester<F> {
    /// Creates a harvester over any feed source
    ///
    /// # Arguments
    ///
    /// * `config` - The sweep configuration
    /// * `source` - The feed to read from
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(SweepError)` - The configured window could not be parsed
    pub fn new(config: Config, source: F) -> Result<Self, SweepError> {
        let ctx = CrawlContext::from_config(&config)?;
        Ok(Self {
            config,
            source,
            store: RecordStore::new(),
            ctx,
        })
    }

    /// Runs the forward pass, the rescan and the redo pass
    pub async fn run(&mut self) -> Result<SweepOutcome, SweepError> {
        tracing::info!("Starting sweep over window {}", self.ctx.window);

        // Walk the feed down to the start of the window
        let forward = self.forward_pass().await?;
        tracing::info!(
            "Forward pass done: {} pages, {} records",
            forward.pages_fetched,
            self.store.len()
        );

        // Look for posts bumped behind the forward pass
        let rescan = self.rescan_pass().await?;
        tracing::info!(
            "Rescan done after {} sweeps ({}), {} posts to redo",
            rescan.iterations,
            if rescan.converged { "converged" } else { "not converged" },
            rescan.redo.len()
        );

        // Refresh whatever moved while the forward pass was running
        let redo = self.redo_pass(&rescan).await?;
        tracing::info!(
            "Redo pass done: {} posts in {} batches, {} records total",
            redo.processed,
            redo.batches,
            self.store.len()
        );

        Ok(SweepOutcome {
            forward,
            rescan,
            redo,
        })
    }

    /// Walks the feed from the configured start cursor
    pub async fn forward_pass(&mut self) -> Result<ForwardOutcome, SweepError> {
        forward_crawl(
            &self.source,
            &self.ctx,
            &mut self.store,
            &self.config.feed.start_cursor,
        )
        .await
    }

    /// Collects posts bumped since they were last seen
    pub async fn rescan_pass(&self) -> Result<RescanOutcome, SweepError> {
        let bound = self.rescan_bound();
        tracing::debug!("Rescan lower bound: {:?}", bound);
        collect_redo_posts(&self.source, &self.ctx, &self.store, bound).await
    }

    /// Reprocesses the posts a rescan collected
    pub async fn redo_pass(&mut self, rescan: &RescanOutcome) -> Result<RedoOutcome, SweepError> {
        process_redo_posts(&self.source, &self.ctx, &mut self.store, &rescan.redo).await
    }

    /// Newest stored activity, falling back to the start of the window
    fn rescan_bound(&self) -> Option<i64> {
        match self.store.max_post_activity() {
            Some(latest) => latest.timestamp_nanos_opt(),
            None => self.ctx.window.from().and_then(|d| d.start_of_day_nanos()),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn into_store(self) -> RecordStore {
        self.store
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    pub fn window(&self) -> &DateWindow {
        &self.ctx.window
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
