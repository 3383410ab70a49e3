//! Normalized post and comment records

use crate::feed::{Comment, PostSummary, PostType};
use crate::window::DateBucket;
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;
use std::fmt;

/// Identity of a record: a post's public id, or post id plus comment id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKey {
    Post(String),
    Comment { post: String, comment: String },
}

impl RecordKey {
    pub fn post(public_id: &str) -> Self {
        Self::Post(public_id.to_string())
    }

    pub fn comment(public_id: &str, comment_id: &str) -> Self {
        Self::Comment {
            post: public_id.to_string(),
            comment: comment_id.to_string(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post(id) => write!(f, "{}", id),
            Self::Comment { post, comment } => write!(f, "{}/{}", post, comment),
        }
    }
}

/// Escapes characters that would break a markdown table cell or link label
pub fn clean_title(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\n' => cleaned.push(' '),
            '|' | '[' | ']' | '(' | ')' | '_' | '*' => {
                cleaned.push('\\');
                cleaned.push(c);
            }
            _ => cleaned.push(c),
        }
    }
    cleaned
}

/// A post accepted into the harvest
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub post_type: PostType,
    pub community: String,
    /// Markdown-escaped, single-line title
    pub title: String,
    pub username: String,
    pub public_id: String,
    pub last_activity: DateTime<FixedOffset>,
    pub is_bot: bool,
    pub created: DateBucket,
}

impl PostRecord {
    pub fn from_summary(summary: &PostSummary, ignored_users: &HashSet<String>) -> Self {
        Self {
            post_type: summary.post_type.clone(),
            community: summary.community_name.clone(),
            title: clean_title(&summary.title),
            username: summary.username.clone(),
            public_id: summary.public_id.clone(),
            last_activity: summary.last_activity_at,
            is_bot: ignored_users.contains(&summary.username),
            created: summary.created_day(),
        }
    }
}

/// A comment accepted into the harvest
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub community: String,
    pub username: String,
    pub post_public_id: String,
    pub comment_id: String,
    pub is_bot: bool,
}

impl CommentRecord {
    pub fn new(post: &PostSummary, comment: &Comment, ignored_users: &HashSet<String>) -> Self {
        Self {
            community: post.community_name.clone(),
            username: comment.username.clone(),
            post_public_id: post.public_id.clone(),
            comment_id: comment.id.clone(),
            is_bot: ignored_users.contains(&comment.username),
        }
    }
}

/// Discriminant of a record, with the post type for posts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Post(PostType),
    Comment,
}

impl RecordKind {
    /// Display label: the title-cased post type, or `Comment`
    pub fn label(&self) -> String {
        match self {
            Self::Post(post_type) => post_type.title_case(),
            Self::Comment => "Comment".to_string(),
        }
    }
}

/// One entry of the record store
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Post(PostRecord),
    Comment(CommentRecord),
}

impl Record {
    pub fn key(&self) -> RecordKey {
        match self {
            Self::Post(post) => RecordKey::post(&post.public_id),
            Self::Comment(c) => RecordKey::comment(&c.post_public_id, &c.comment_id),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Post(post) => RecordKind::Post(post.post_type.clone()),
            Self::Comment(_) => RecordKind::Comment,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    pub fn community(&self) -> &str {
        match self {
            Self::Post(post) => &post.community,
            Self::Comment(c) => &c.community,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Self::Post(post) => &post.username,
            Self::Comment(c) => &c.username,
        }
    }

    /// The post's own id, or the parent post id for a comment
    pub fn public_id(&self) -> &str {
        match self {
            Self::Post(post) => &post.public_id,
            Self::Comment(c) => &c.post_public_id,
        }
    }

    /// Post title; empty for comments
    pub fn title(&self) -> &str {
        match self {
            Self::Post(post) => &post.title,
            Self::Comment(_) => "",
        }
    }

    pub fn last_activity(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Post(post) => Some(post.last_activity),
            Self::Comment(_) => None,
        }
    }

    pub fn is_bot(&self) -> bool {
        match self {
            Self::Post(post) => post.is_bot,
            Self::Comment(c) => c.is_bot,
        }
    }

    /// Creation day of a post; comments carry none
    pub fn created(&self) -> Option<DateBucket> {
        match self {
            Self::Post(post) => Some(post.created),
            Self::Comment(_) => None,
        }
    }

    /// Flattens the record into the row shape handed to reporting and export
    pub fn to_row(&self) -> RecordRow {
        RecordRow {
            key: self.key().to_string(),
            kind: self.kind().label(),
            community: self.community().to_string(),
            title: self.title().to_string(),
            username: self.username().to_string(),
            public_id: self.public_id().to_string(),
            last_activity: self.last_activity().map(|ts| ts.to_rfc3339()),
            is_bot: self.is_bot(),
            create_date: self.created().map(|day| day.to_string()),
        }
    }
}

/// Flat, string-typed projection of a [`Record`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub key: String,
    pub kind: String,
    pub community: String,
    pub title: String,
    pub username: String,
    pub public_id: String,
    pub last_activity: Option<String>,
    pub is_bot: bool,
    pub create_date: Option<String>,
}
