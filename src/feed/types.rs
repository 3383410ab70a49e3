//! Wire shapes of the feed, post detail and comment endpoints

use crate::window::DateBucket;
use crate::SweepError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Post kinds served by the feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "String")]
pub enum PostType {
    Text,
    Image,
    Link,
    Other(String),
}

impl From<String> for PostType {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "image" => Self::Image,
            "link" => Self::Link,
            _ => Self::Other(raw),
        }
    }
}

impl PostType {
    /// Title-cased display name, as stored on a post record
    pub fn title_case(&self) -> String {
        match self {
            Self::Text => "Text".to_string(),
            Self::Image => "Image".to_string(),
            Self::Link => "Link".to_string(),
            Self::Other(raw) => {
                let mut chars = raw.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(|c| c.to_lowercase()))
                        .collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title_case())
    }
}

/// One entry of a feed page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub public_id: String,
    pub community_name: String,
    pub username: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub created_at: DateTime<FixedOffset>,
    pub last_activity_at: DateTime<FixedOffset>,
    /// Sent as `noComments`: the post's comment count
    #[serde(rename = "noComments", default, deserialize_with = "truthy_count")]
    pub comment_count: u64,
}

impl PostSummary {
    pub fn created_day(&self) -> DateBucket {
        DateBucket::of(&self.created_at)
    }

    pub fn activity_day(&self) -> DateBucket {
        DateBucket::of(&self.last_activity_at)
    }

    /// Last activity as nanoseconds since the epoch, the unit of feed cursors
    pub fn activity_nanos(&self) -> Option<i64> {
        self.last_activity_at.timestamp_nanos_opt()
    }

    /// Whether the comment endpoints must be consulted for this post
    pub fn needs_comment_fetch(&self) -> bool {
        self.comment_count > 0
    }
}

/// A single comment on a post
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub edited_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<FixedOffset>>,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The edit date when present, otherwise the creation date
    pub fn effective_day(&self) -> DateBucket {
        DateBucket::of(self.edited_at.as_ref().unwrap_or(&self.created_at))
    }
}

/// A page of the activity feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPage {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub posts: Vec<PostSummary>,
    /// `None` means end of feed
    #[serde(default, deserialize_with = "cursor")]
    pub next: Option<String>,
}

/// A page of comments, from either the post detail or the comments endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPage {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub comments: Vec<Comment>,
    #[serde(default, deserialize_with = "cursor")]
    pub next: Option<String>,
}

/// Post detail response; only the comment fields are consumed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub comments: Vec<Comment>,
    #[serde(default, deserialize_with = "cursor")]
    pub comments_next: Option<String>,
}

impl From<PostDetail> for CommentPage {
    fn from(detail: PostDetail) -> Self {
        Self {
            comments: detail.comments,
            next: detail.comments_next,
        }
    }
}

/// Interprets a feed cursor as its ordering value.
///
/// Activity-sorted feed cursors are the last-activity time of the page
/// boundary in nanoseconds, decreasing with depth.
pub fn cursor_ordering(cursor: &str) -> Result<i64, SweepError> {
    cursor
        .trim()
        .parse::<i64>()
        .map_err(|_| SweepError::MalformedCursor(cursor.to_string()))
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCursor {
    Text(String),
    Number(i64),
}

fn cursor<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCursor>::deserialize(deserializer)? {
        Some(RawCursor::Text(s)) if !s.is_empty() => Some(s),
        Some(RawCursor::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Flag(bool),
    Count(u64),
}

fn truthy_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCount>::deserialize(deserializer)? {
        Some(RawCount::Flag(flag)) => u64::from(flag),
        Some(RawCount::Count(n)) => n,
        None => 0,
    })
}
