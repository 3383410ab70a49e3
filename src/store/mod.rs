//! Record store for the harvest
//!
//! This module holds the single accumulator shared by the forward pass and
//! the redo pass:
//! - Normalized post and comment records and their keys
//! - The keyed, insertion-ordered in-memory store

mod memory;
mod record;

pub use memory::RecordStore;
pub use record::{clean_title, CommentRecord, PostRecord, Record, RecordKey, RecordKind, RecordRow};
