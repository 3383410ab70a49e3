//! Access to the remote activity feed
//!
//! This module contains:
//! - The wire types for feed pages, post summaries and comments
//! - The [`FeedSource`] seam the crawl phases are written against
//! - [`DiscuitClient`], the HTTP implementation of that seam

mod client;
mod types;

pub use client::{build_http_client, DiscuitClient};
pub use types::{cursor_ordering, Comment, CommentPage, FeedPage, PostDetail, PostSummary, PostType};

use crate::SweepError;
use async_trait::async_trait;

/// A cursor-paginated, activity-sorted feed and its comment endpoints
///
/// Calls are awaited one at a time by the crawler; implementations do not
/// need to support concurrent requests.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches one feed page. An empty cursor means the top of the feed.
    async fn fetch_feed_page(&self, cursor: &str) -> Result<FeedPage, SweepError>;

    /// Fetches the post detail and returns its first page of comments
    async fn fetch_post_comments(&self, public_id: &str) -> Result<CommentPage, SweepError>;

    /// Fetches a further page of a post's comments
    async fn fetch_comment_page(
        &self,
        public_id: &str,
        cursor: &str,
    ) -> Result<CommentPage, SweepError>;
}

/// Collects all comments of a post across comment pagination
///
/// Paging stops at the first empty page or when no further cursor is given.
pub async fn fetch_all_comments<F>(source: &F, public_id: &str) -> Result<Vec<Comment>, SweepError>
where
    F: FeedSource + ?Sized,
{
    let mut page = source.fetch_post_comments(public_id).await?;
    let mut comments = Vec::new();

    while !page.comments.is_empty() {
        comments.append(&mut page.comments);
        match page.next.take() {
            Some(cursor) => {
                tracing::trace!("Fetching comments of {} after {}", public_id, cursor);
                page = source.fetch_comment_page(public_id, &cursor).await?;
            }
            None => break,
        }
    }

    Ok(comments)
}
