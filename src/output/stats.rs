//! Headline statistics and the bot flag consistency gate

use crate::store::{Record, RecordStore};
use crate::SweepError;
use std::collections::HashSet;

/// Headline numbers of a harvest, over non-bot records only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    /// Comments written by non-bot users
    pub comments: usize,

    /// Distinct communities with non-bot activity
    pub communities: usize,

    /// Distinct non-bot users
    pub active_users: usize,

    /// Distinct posts with non-bot activity
    pub active_posts: usize,
}

impl ReportStats {
    pub fn from_store(store: &RecordStore) -> Self {
        let mut communities = HashSet::new();
        let mut users = HashSet::new();
        let mut posts = HashSet::new();
        let mut comments = 0;

        for record in store.iter().filter(|r| !r.is_bot()) {
            if record.is_comment() {
                comments += 1;
            }
            communities.insert(record.community());
            users.insert(record.username());
            posts.insert(record.public_id());
        }

        Self {
            comments,
            communities: communities.len(),
            active_users: users.len(),
            active_posts: posts.len(),
        }
    }
}

/// Verifies every record's bot flag matches the ignore list.
///
/// The flag is derived at insertion time, so a mismatch means the store was
/// built against a different ignore list and the report would be wrong.
pub fn bot_flag_check(store: &RecordStore, ignored_users: &HashSet<String>) -> Result<(), SweepError> {
    let mismatched: Vec<&Record> = store
        .iter()
        .filter(|r| r.is_bot() != ignored_users.contains(r.username()))
        .collect();

    if let Some(first) = mismatched.first() {
        return Err(SweepError::DataConsistency(format!(
            "{} records have a bot flag that disagrees with the ignore list (first: {} by {})",
            mismatched.len(),
            first.key(),
            first.username()
        )));
    }

    Ok(())
}

/// Prints headline numbers to stdout
pub fn print_statistics(stats: &ReportStats, total_records: usize) {
    println!("=== Sweep Statistics ===\n");
    println!("  Records collected: {}", total_records);
    println!("  Active users: {}", stats.active_users);
    println!("  Active posts: {}", stats.active_posts);
    println!("  Comments: {}", stats.comments);
    println!("  Communities: {}", stats.communities);
}
