//! Forward pass: walk the feed from the cursor down to the window's start
//!
//! Feed order is descending last activity, so the first post whose activity
//! day falls below the window's lower bound ends the pass: nothing after it
//! can still be in range.
//!
//! A post is kept if its own dates are in the window, if it is already on
//! record, or if any of its comments is in the window. Comments are checked
//! even for out-of-window posts, because a post created long ago can carry a
//! comment from this week.

use crate::crawler::CrawlContext;
use crate::feed::{fetch_all_comments, FeedSource, PostSummary};
use crate::store::{CommentRecord, PostRecord, RecordStore};
use crate::window::{comment_in_window, post_in_window, DateBucket};
use crate::SweepError;

/// Which pass a batch of summaries comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Summaries in feed order; a below-window post ends the batch
    Forward,
    /// Summaries from the redo set, in no particular order
    Redo,
}

/// Result of processing one batch of summaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Activity day of the last summary processed
    pub last_activity_day: Option<DateBucket>,
    /// A forward batch stopped at a summary below the window's lower bound.
    /// Always false for redo batches, which skip such summaries.
    pub reached_time_limit: bool,
    /// Posts written (inserted or overwritten)
    pub posts_saved: usize,
    /// Comments newly inserted
    pub comments_saved: usize,
}

/// Result of the whole forward pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardOutcome {
    pub pages_fetched: usize,
    pub last_activity_day: Option<DateBucket>,
    pub reached_time_limit: bool,
    pub posts_saved: usize,
    pub comments_saved: usize,
}

enum ForwardState {
    Running(String),
    Done,
}

/// Runs the forward pass from `start_cursor` (empty for the top of the feed)
pub async fn forward_crawl<F>(
    source: &F,
    ctx: &CrawlContext,
    store: &mut RecordStore,
    start_cursor: &str,
) -> Result<ForwardOutcome, SweepError>
where
    F: FeedSource + ?Sized,
{
    let mut outcome = ForwardOutcome::default();
    let mut state = ForwardState::Running(start_cursor.to_string());

    while let ForwardState::Running(cursor) = state {
        tracing::info!(
            "Pagination cursor is: {:?}; last processed post date was: {}",
            cursor,
            outcome
                .last_activity_day
                .map(|d| d.to_string())
                .unwrap_or_default()
        );

        // Fetch the next page of the feed
        let page = source.fetch_feed_page(&cursor).await?;
        outcome.pages_fetched += 1;

        // Apply the acceptance rules to its posts
        let batch = process_posts(source, ctx, store, &page.posts, PassKind::Forward).await?;
        if batch.last_activity_day.is_some() {
            outcome.last_activity_day = batch.last_activity_day;
        }
        outcome.posts_saved += batch.posts_saved;
        outcome.comments_saved += batch.comments_saved;

        // Decide whether to follow the cursor
        state = match page.next {
            _ if batch.reached_time_limit => {
                outcome.reached_time_limit = true;
                tracing::info!("Reached posts older than the window, forward pass done");
                ForwardState::Done
            }
            None => {
                tracing::info!("Reached the end of the feed, forward pass done");
                ForwardState::Done
            }
            Some(next) => {
                ctx.throttle.pause().await;
                ForwardState::Running(next)
            }
        };
    }

    Ok(outcome)
}

/// Applies the acceptance rules to a batch of summaries
pub async fn process_posts<F>(
    source: &F,
    ctx: &CrawlContext,
    store: &mut RecordStore,
    posts: &[PostSummary],
    pass: PassKind,
) -> Result<BatchOutcome, SweepError>
where
    F: FeedSource + ?Sized,
{
    let mut outcome = BatchOutcome::default();

    for post in posts {
        let activity_day = post.activity_day();

        if ctx.window.is_before_start(activity_day) {
            match pass {
                // Feed order: everything after this is older still
                PassKind::Forward => {
                    outcome.reached_time_limit = true;
                    break;
                }
                PassKind::Redo => {
                    tracing::debug!(
                        "Skipping {}: last activity {} is before the window",
                        post.public_id,
                        activity_day
                    );
                    continue;
                }
            }
        }

        let date_valid = post_in_window(&ctx.window, post.created_day(), activity_day);

        // An old post still counts if one of its comments is in the window
        let mut any_comment_valid = false;
        if post.needs_comment_fetch() {
            let (valid, inserted) = process_comments(source, ctx, store, post).await?;
            any_comment_valid = valid;
            outcome.comments_saved += inserted;
        } else {
            tracing::trace!("{} reports no comments, skipping detail fetch", post.public_id);
        }

        // Posts already on record are always rewritten to refresh their activity
        if any_comment_valid || date_valid || store.contains_post(&post.public_id) {
            let record = PostRecord::from_summary(post, &ctx.ignored_users);
            if store.upsert_post(record) {
                tracing::debug!("Saved post {} ({})", post.public_id, post.community_name);
            } else {
                tracing::debug!("Refreshed post {}", post.public_id);
            }
            outcome.posts_saved += 1;
        } else {
            tracing::trace!("Post {} is outside the window", post.public_id);
        }

        outcome.last_activity_day = Some(activity_day);
    }

    Ok(outcome)
}

/// Fetches a post's comments and stores those in the window.
///
/// Returns whether any comment counts for the window, and how many were
/// newly inserted.
async fn process_comments<F>(
    source: &F,
    ctx: &CrawlContext,
    store: &mut RecordStore,
    post: &PostSummary,
) -> Result<(bool, usize), SweepError>
where
    F: FeedSource + ?Sized,
{
    let comments = fetch_all_comments(source, &post.public_id).await?;
    let mut any_valid = false;
    let mut inserted = 0;

    for comment in &comments {
        // Stored comments keep counting and are never rewritten
        let accepted = store.contains_comment(&post.public_id, &comment.id);
        if !comment_in_window(&ctx.window, comment, accepted) {
            continue;
        }
        any_valid = true;
        if !accepted && store.insert_comment(CommentRecord::new(post, comment, &ctx.ignored_users)) {
            inserted += 1;
        }
    }

    tracing::trace!(
        "{}: {} comments fetched, {} new",
        post.public_id,
        comments.len(),
        inserted
    );

    Ok((any_valid, inserted))
}
