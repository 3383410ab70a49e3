//! Redo pass: reprocess bumped posts in fixed-size batches

use crate::crawler::forward::{process_posts, PassKind};
use crate::crawler::CrawlContext;
use crate::feed::{FeedSource, PostSummary};
use crate::store::RecordStore;
use crate::SweepError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedoOutcome {
    pub processed: usize,
    pub batches: usize,
    pub posts_saved: usize,
    pub comments_saved: usize,
}

/// Runs the acceptance rules over `posts`, `batch_size` at a time, pausing
/// between batches.
pub async fn process_redo_posts<F>(
    source: &F,
    ctx: &CrawlContext,
    store: &mut RecordStore,
    posts: &[PostSummary],
) -> Result<RedoOutcome, SweepError>
where
    F: FeedSource + ?Sized,
{
    let mut outcome = RedoOutcome::default();
    let batch_size = ctx.redo_batch_size.max(1);

    for (i, batch) in posts.chunks(batch_size).enumerate() {
        // Pause between batches, not before the first
        if i > 0 {
            ctx.throttle.pause().await;
        }
        tracing::debug!("Redo batch {}: {} posts", i + 1, batch.len());

        let result = process_posts(source, ctx, store, batch, PassKind::Redo).await?;
        outcome.batches += 1;
        outcome.processed += batch.len();
        outcome.posts_saved += result.posts_saved;
        outcome.comments_saved += result.comments_saved;
    }

    Ok(outcome)
}
