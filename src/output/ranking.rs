//! Top-N tables over the harvest
//!
//! Ranking is competition ("min") ranking on a descending count: tied rows
//! share the best rank and the next rank skips accordingly (1, 2, 2, 4).
//! A table keeps every row ranked at or above the cutoff, so ties at the
//! boundary can make it longer than the cutoff.

use crate::feed::PostType;
use crate::store::{Record, RecordStore};
use crate::window::DateWindow;
use std::collections::{BTreeMap, HashMap};

/// Placeholder account shown for deleted users
pub const GHOST_USER: &str = "ghost";

/// Competition ranks of `values`, highest value first
pub fn min_rank(values: &[u64]) -> Vec<usize> {
    values
        .iter()
        .map(|v| 1 + values.iter().filter(|other| *other > v).count())
        .collect()
}

/// A post in its type's table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub rank: usize,
    pub community: String,
    pub title: String,
    pub username: String,
    pub public_id: String,
    pub comments: u64,
}

/// A community or user in an engagement table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngagementRow {
    pub rank: usize,
    pub name: String,
    pub texts: u64,
    pub images: u64,
    pub links: u64,
    pub total_posts: u64,
    pub comments: u64,
}

impl EngagementRow {
    pub fn total_engagement(&self) -> u64 {
        self.total_posts + self.comments
    }

    fn count(&mut self, record: &Record) {
        match record {
            Record::Comment(_) => self.comments += 1,
            Record::Post(post) => {
                match post.post_type {
                    PostType::Text => self.texts += 1,
                    PostType::Image => self.images += 1,
                    PostType::Link => self.links += 1,
                    PostType::Other(_) => {}
                }
                self.total_posts += 1;
            }
        }
    }
}

/// Most commented posts, one table per post type, tables ordered by type name
pub fn top_posts_by_type(store: &RecordStore, top_n: usize) -> Vec<(PostType, Vec<PostRow>)> {
    let mut comment_counts: HashMap<&str, u64> = HashMap::new();
    for comment in store.comments() {
        *comment_counts.entry(comment.post_public_id.as_str()).or_default() += 1;
    }

    let mut by_type: BTreeMap<String, (PostType, Vec<PostRow>)> = BTreeMap::new();
    for post in store.posts() {
        let row = PostRow {
            rank: 0,
            community: post.community.clone(),
            title: post.title.clone(),
            username: post.username.clone(),
            public_id: post.public_id.clone(),
            comments: comment_counts.get(post.public_id.as_str()).copied().unwrap_or(0),
        };
        by_type
            .entry(post.post_type.title_case())
            .or_insert_with(|| (post.post_type.clone(), Vec::new()))
            .1
            .push(row);
    }

    by_type
        .into_values()
        .map(|(post_type, rows)| {
            let counts: Vec<u64> = rows.iter().map(|r| r.comments).collect();
            let ranks = min_rank(&counts);
            let rows = keep_top(rows, ranks, top_n, |row, rank| row.rank = rank);
            (post_type, rows)
        })
        .collect()
}

/// Communities by posts plus comments
///
/// Posts created outside the window are left out; they are on record only
/// because of their comments.
pub fn top_communities(store: &RecordStore, window: &DateWindow, top_n: usize) -> Vec<EngagementRow> {
    engagement_table(store, window, top_n, |record| Some(record.community()))
}

/// Users by posts plus comments, excluding bots and deleted accounts
pub fn top_users(store: &RecordStore, window: &DateWindow, top_n: usize) -> Vec<EngagementRow> {
    engagement_table(store, window, top_n, |record| {
        if record.is_bot() || record.username() == GHOST_USER {
            None
        } else {
            Some(record.username())
        }
    })
}

fn engagement_table<'a, G>(
    store: &'a RecordStore,
    window: &DateWindow,
    top_n: usize,
    group: G,
) -> Vec<EngagementRow>
where
    G: Fn(&'a Record) -> Option<&'a str>,
{
    let mut groups: BTreeMap<&str, EngagementRow> = BTreeMap::new();

    for record in store.iter() {
        if record.created().is_some_and(|day| !window.contains(day)) {
            continue;
        }
        if let Some(name) = group(record) {
            groups
                .entry(name)
                .or_insert_with(|| EngagementRow {
                    name: name.to_string(),
                    ..Default::default()
                })
                .count(record);
        }
    }

    let rows: Vec<EngagementRow> = groups.into_values().collect();
    let totals: Vec<u64> = rows.iter().map(EngagementRow::total_engagement).collect();
    let ranks = min_rank(&totals);
    keep_top(rows, ranks, top_n, |row, rank| row.rank = rank)
}

/// Assigns ranks, drops rows below the cutoff and orders by rank
fn keep_top<T>(
    rows: Vec<T>,
    ranks: Vec<usize>,
    top_n: usize,
    set_rank: impl Fn(&mut T, usize),
) -> Vec<T> {
    let mut kept: Vec<(usize, T)> = rows
        .into_iter()
        .zip(ranks)
        .filter(|(_, rank)| *rank <= top_n)
        .map(|(mut row, rank)| {
            set_rank(&mut row, rank);
            (rank, row)
        })
        .collect();
    kept.sort_by_key(|(rank, _)| *rank);
    kept.into_iter().map(|(_, row)| row).collect()
}
