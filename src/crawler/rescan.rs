//! Rescan: find posts that were bumped while the forward pass was running
//!
//! The feed is sorted by last activity, so a post that gets a new comment
//! mid-crawl jumps to the top and the forward pass, already past that point,
//! never sees its new state. The rescan sweeps the top of the feed down to a
//! lower bound (the newest activity already on record) and collects every
//! post whose activity moved. Sweeps repeat until the leading post is the
//! same on two consecutive sweeps, which means nothing was bumped in between.

use crate::crawler::CrawlContext;
use crate::feed::{cursor_ordering, FeedSource, PostSummary};
use crate::store::RecordStore;
use crate::SweepError;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// Posts to reprocess, keyed by public id.
///
/// Within one rescan a post appears once; a newer sighting replaces the
/// older one while keeping its place.
#[derive(Debug, Default)]
pub struct RedoSet {
    entries: HashMap<String, PostSummary>,
    order: Vec<String>,
}

impl RedoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.entries.contains_key(public_id)
    }

    /// Considers a post seen during a sweep.
    ///
    /// Returns true if the set changed.
    pub fn observe(&mut self, post: &PostSummary, ctx: &CrawlContext, store: &RecordStore) -> bool {
        // Created after the window closes; can never count
        if ctx.window.is_after_end(post.created_day()) {
            return false;
        }

        // Already queued at this activity
        if let Some(seen) = self.entries.get(&post.public_id) {
            if seen.last_activity_at == post.last_activity_at {
                return false;
            }
        }

        // Stored and not bumped since
        if let Some(stored) = store.post(&post.public_id) {
            if stored.last_activity == post.last_activity_at {
                return false;
            }
        }

        if self
            .entries
            .insert(post.public_id.clone(), post.clone())
            .is_none()
        {
            self.order.push(post.public_id.clone());
        }
        true
    }

    /// Posts in first-seen order
    pub fn into_posts(mut self) -> Vec<PostSummary> {
        self.order
            .iter()
            .filter_map(|id| self.entries.remove(id))
            .collect()
    }
}

/// First post of a sweep, used to detect convergence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadItem {
    pub public_id: String,
    pub last_activity: DateTime<FixedOffset>,
}

impl LeadItem {
    fn of(post: &PostSummary) -> Self {
        Self {
            public_id: post.public_id.clone(),
            last_activity: post.last_activity_at,
        }
    }

    pub fn activity_nanos(&self) -> Option<i64> {
        self.last_activity.timestamp_nanos_opt()
    }
}

/// Result of the rescan phase
#[derive(Debug, Default)]
pub struct RescanOutcome {
    /// Posts to reprocess, in first-seen order
    pub redo: Vec<PostSummary>,
    /// The lead item was stable across two consecutive sweeps
    pub converged: bool,
    /// Number of sweeps performed
    pub iterations: u32,
}

/// One sweep from the top of the feed down to `lower_bound`.
///
/// Returns the first post of the sweep, or None for an empty feed.
async fn sweep<F>(
    source: &F,
    ctx: &CrawlContext,
    store: &RecordStore,
    redo: &mut RedoSet,
    lower_bound: Option<i64>,
) -> Result<Option<LeadItem>, SweepError>
where
    F: FeedSource + ?Sized,
{
    let mut lead = None;
    let mut cursor = String::new();

    loop {
        let page = source.fetch_feed_page(&cursor).await?;

        // The first post of the sweep is its lead item
        if lead.is_none() {
            lead = page.posts.first().map(LeadItem::of);
        }
        for post in &page.posts {
            if redo.observe(post, ctx, store) {
                tracing::debug!("Queued {} for redo", post.public_id);
            }
        }

        ctx.throttle.pause().await;

        let next = match page.next {
            Some(next) => next,
            None => break,
        };
        // Stop once the next page starts below the bound
        if let Some(bound) = lower_bound {
            if cursor_ordering(&next)? < bound {
                break;
            }
        }
        cursor = next;
    }

    Ok(lead)
}

/// Sweeps the top of the feed until the lead item is stable.
///
/// `lower_bound` is the cursor ordering (nanoseconds) below which the first
/// sweep stops; None sweeps the whole feed. Each later sweep stops at the
/// previous sweep's lead item. Gives up with `converged == false` after the
/// configured number of sweeps.
pub async fn collect_redo_posts<F>(
    source: &F,
    ctx: &CrawlContext,
    store: &RecordStore,
    lower_bound: Option<i64>,
) -> Result<RescanOutcome, SweepError>
where
    F: FeedSource + ?Sized,
{
    let mut redo = RedoSet::new();
    let mut previous: Option<LeadItem> = None;
    let mut bound = lower_bound;
    let mut iterations = 0;

    while iterations < ctx.max_rescan_iterations {
        iterations += 1;
        let lead = sweep(source, ctx, store, &mut redo, bound).await?;
        tracing::info!(
            "Rescan sweep {}: lead {:?}, {} posts queued",
            iterations,
            lead.as_ref().map(|l| l.public_id.as_str()),
            redo.len()
        );

        let lead = match lead {
            Some(lead) => lead,
            None => {
                tracing::info!("Feed is empty, nothing to rescan");
                return Ok(RescanOutcome {
                    redo: redo.into_posts(),
                    converged: true,
                    iterations,
                });
            }
        };

        // Same lead twice in a row: nothing was bumped in between
        if previous.as_ref() == Some(&lead) {
            return Ok(RescanOutcome {
                redo: redo.into_posts(),
                converged: true,
                iterations,
            });
        }
        // The next sweep only needs to reach this sweep's lead
        bound = lead.activity_nanos();
        previous = Some(lead);
    }

    tracing::warn!(
        "Feed did not settle after {} rescan sweeps, continuing with {} posts",
        iterations,
        redo.len()
    );
    Ok(RescanOutcome {
        redo: redo.into_posts(),
        converged: false,
        iterations,
    })
}
