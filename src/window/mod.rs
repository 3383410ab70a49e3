//! Date window and the in-window predicates
//!
//! The window is closed on both ends and either end may be absent. An absent
//! bound is an infinity, never an ordinary value, so a blank `to-date` can
//! not accidentally compare below a real date.

mod bucket;
mod filter;

pub use bucket::DateBucket;
pub use filter::{comment_in_window, post_in_window};

/// A closed, possibly one-sided, range of days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    from: Option<DateBucket>,
    to: Option<DateBucket>,
}

impl DateWindow {
    pub fn new(from: Option<DateBucket>, to: Option<DateBucket>) -> Self {
        Self { from, to }
    }

    /// A window with no bounds at all
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn from(&self) -> Option<DateBucket> {
        self.from
    }

    pub fn to(&self) -> Option<DateBucket> {
        self.to
    }

    /// True if `day` lies in `[from, to]`
    pub fn contains(&self, day: DateBucket) -> bool {
        !self.is_before_start(day) && !self.is_after_end(day)
    }

    /// True if a lower bound is set and `day` is strictly below it
    pub fn is_before_start(&self, day: DateBucket) -> bool {
        self.from.is_some_and(|from| day < from)
    }

    /// True if an upper bound is set and `day` is strictly above it
    pub fn is_after_end(&self, day: DateBucket) -> bool {
        self.to.is_some_and(|to| day > to)
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.from, self.to) {
            (Some(from), Some(to)) => write!(f, "{}-{}", from, to),
            (Some(from), None) => write!(f, "{}-", from),
            (None, Some(to)) => write!(f, "-{}", to),
            (None, None) => write!(f, "all time"),
        }
    }
}
