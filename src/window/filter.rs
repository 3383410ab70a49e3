use crate::feed::Comment;
use crate::window::{DateBucket, DateWindow};

/// True if the post was created or last active inside the window
pub fn post_in_window(window: &DateWindow, created: DateBucket, last_activity: DateBucket) -> bool {
    window.contains(created) || window.contains(last_activity)
}

/// Decides whether a comment belongs to the harvest.
///
/// A comment already in the record store stays accepted whatever its dates
/// say now, so replaying a post never retracts comments. Otherwise deleted
/// comments are rejected and the edit date, falling back to the creation
/// date, must lie inside the window.
pub fn comment_in_window(window: &DateWindow, comment: &Comment, already_accepted: bool) -> bool {
    if already_accepted {
        return true;
    }
    if comment.is_deleted() {
        return false;
    }
    window.contains(comment.effective_day())
}
