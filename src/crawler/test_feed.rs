//! Scripted in-memory feed for exercising the crawl phases
//!
//! The feed is a list of snapshots. The first top-of-feed request reads
//! snapshot 0; each later top-of-feed request moves to the next snapshot
//! (staying on the last one), which is how posts get bumped between passes.
//! A post's comments are hidden while they are newer than the post's last
//! activity in the current snapshot, so bumps can bring in new comments.

use crate::feed::{Comment, CommentPage, FeedPage, FeedSource, PostSummary, PostType};
use crate::SweepError;
use async_trait::async_trait;
use chrono::DateTime;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn summary(id: &str, created: &str, activity: &str, comment_count: u64) -> PostSummary {
    PostSummary {
        public_id: id.to_string(),
        community_name: "general".to_string(),
        username: format!("{}-author", id),
        title: format!("Post {}", id),
        post_type: PostType::Text,
        created_at: DateTime::parse_from_rfc3339(created).unwrap(),
        last_activity_at: DateTime::parse_from_rfc3339(activity).unwrap(),
        comment_count,
    }
}

pub fn comment(id: &str, user: &str, created: &str) -> Comment {
    Comment {
        id: id.to_string(),
        username: user.to_string(),
        created_at: DateTime::parse_from_rfc3339(created).unwrap(),
        edited_at: None,
        deleted_at: None,
    }
}

#[derive(Default)]
struct FeedState {
    snapshots: Vec<Vec<Vec<PostSummary>>>,
    current: Option<usize>,
    comments: HashMap<String, Vec<Vec<Comment>>>,
    feed_requests: Vec<String>,
    comment_requests: Vec<String>,
}

#[derive(Default)]
pub struct ScriptedFeed {
    state: Mutex<FeedState>,
}

impl ScriptedFeed {
    /// A feed whose snapshots are given as pages of posts
    pub fn new(snapshots: Vec<Vec<Vec<PostSummary>>>) -> Self {
        Self {
            state: Mutex::new(FeedState {
                snapshots,
                ..Default::default()
            }),
        }
    }

    /// A feed that never changes
    pub fn fixed(pages: Vec<Vec<PostSummary>>) -> Self {
        Self::new(vec![pages])
    }

    pub fn with_comments(self, public_id: &str, pages: Vec<Vec<Comment>>) -> Self {
        self.state
            .lock()
            .unwrap()
            .comments
            .insert(public_id.to_string(), pages);
        self
    }

    /// Cursors of every feed request made so far
    pub fn feed_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().feed_requests.clone()
    }

    /// Public ids of every comment request made so far (detail and pages)
    pub fn comment_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().comment_requests.clone()
    }

    fn page_cursor(page: &[PostSummary]) -> Option<String> {
        page.last()
            .and_then(|p| p.activity_nanos())
            .map(|nanos| nanos.to_string())
    }
}

#[async_trait]
impl FeedSource for ScriptedFeed {
    async fn fetch_feed_page(&self, cursor: &str) -> Result<FeedPage, SweepError> {
        let mut state = self.state.lock().unwrap();
        state.feed_requests.push(cursor.to_string());

        if cursor.is_empty() {
            let last = state.snapshots.len().saturating_sub(1);
            state.current = Some(state.current.map_or(0, |i| (i + 1).min(last)));
        }

        let snapshot = match state.current.and_then(|i| state.snapshots.get(i)) {
            Some(snapshot) => snapshot,
            None => return Ok(FeedPage::default()),
        };

        let index = if cursor.is_empty() {
            0
        } else {
            snapshot
                .iter()
                .position(|page| Self::page_cursor(page).as_deref() == Some(cursor))
                .map(|i| i + 1)
                .unwrap_or(snapshot.len())
        };

        Ok(match snapshot.get(index) {
            Some(page) => FeedPage {
                posts: page.clone(),
                next: if index + 1 < snapshot.len() {
                    Self::page_cursor(page)
                } else {
                    None
                },
            },
            None => FeedPage::default(),
        })
    }

    async fn fetch_post_comments(&self, public_id: &str) -> Result<CommentPage, SweepError> {
        self.fetch_comment_page(public_id, "0").await
    }

    async fn fetch_comment_page(
        &self,
        public_id: &str,
        cursor: &str,
    ) -> Result<CommentPage, SweepError> {
        let mut state = self.state.lock().unwrap();
        state.comment_requests.push(public_id.to_string());

        let index: usize = cursor.parse().unwrap();
        let pages = state.comments.get(public_id).cloned().unwrap_or_default();
        let visible_until = state
            .current
            .and_then(|i| state.snapshots.get(i))
            .and_then(|snapshot| snapshot.iter().flatten().find(|p| p.public_id == public_id))
            .map(|p| p.last_activity_at);

        let comments = pages
            .get(index)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|c| visible_until.map_or(true, |until| c.created_at <= until))
            .collect();
        Ok(CommentPage {
            comments,
            next: if index + 1 < pages.len() {
                Some((index + 1).to_string())
            } else {
                None
            },
        })
    }
}
