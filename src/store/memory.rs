//! In-memory keyed record store
//!
//! Posts are upserted (a later sighting refreshes the stored activity) and
//! comments are insert-once. Iteration follows first-insertion order, and an
//! overwritten post keeps its original position.

use crate::store::record::{CommentRecord, PostRecord, Record, RecordKey, RecordRow};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// Accumulated harvest of posts and comments
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    index: HashMap<RecordKey, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn contains_post(&self, public_id: &str) -> bool {
        self.contains(&RecordKey::post(public_id))
    }

    pub fn post(&self, public_id: &str) -> Option<&PostRecord> {
        match self.get(&RecordKey::post(public_id)) {
            Some(Record::Post(post)) => Some(post),
            _ => None,
        }
    }

    pub fn contains_comment(&self, public_id: &str, comment_id: &str) -> bool {
        self.contains(&RecordKey::comment(public_id, comment_id))
    }

    /// Inserts a post or overwrites the stored one in place.
    ///
    /// Returns true if the post was not stored before.
    pub fn upsert_post(&mut self, post: PostRecord) -> bool {
        let key = RecordKey::post(&post.public_id);
        match self.index.get(&key) {
            Some(&i) => {
                self.records[i] = Record::Post(post);
                false
            }
            None => {
                self.push(key, Record::Post(post));
                true
            }
        }
    }

    /// Inserts a comment unless one with the same key exists.
    ///
    /// Returns true if the comment was inserted; an existing comment is left
    /// untouched.
    pub fn insert_comment(&mut self, comment: CommentRecord) -> bool {
        let key = RecordKey::comment(&comment.post_public_id, &comment.comment_id);
        if self.index.contains_key(&key) {
            return false;
        }
        self.push(key, Record::Comment(comment));
        true
    }

    fn push(&mut self, key: RecordKey, record: Record) {
        self.index.insert(key, self.records.len());
        self.records.push(record);
    }

    /// All records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn posts(&self) -> impl Iterator<Item = &PostRecord> {
        self.records.iter().filter_map(|r| match r {
            Record::Post(post) => Some(post),
            Record::Comment(_) => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &CommentRecord> {
        self.records.iter().filter_map(|r| match r {
            Record::Comment(c) => Some(c),
            Record::Post(_) => None,
        })
    }

    /// Number of stored comments under a post
    pub fn comment_count(&self, public_id: &str) -> usize {
        self.comments()
            .filter(|c| c.post_public_id == public_id)
            .count()
    }

    /// Latest activity among stored posts
    pub fn max_post_activity(&self) -> Option<DateTime<FixedOffset>> {
        self.posts().map(|p| p.last_activity).max()
    }

    /// Flat rows in insertion order, for reporting and export
    pub fn rows(&self) -> Vec<RecordRow> {
        self.records.iter().map(Record::to_row).collect()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
