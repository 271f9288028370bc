//! Segment storage accounting and retention
//!
//! Keeps a camera's recording directory under a byte budget:
//! - Sums completed segment sizes (non-recursive, `.mp4` only)
//! - Finds the oldest segment by its filename timestamp
//! - Runs a background loop deleting oldest-first until under budget
//!
//! The retention loop shares a directory with the recorder but needs no
//! locking: both sides only create or delete whole files, and every pass
//! tolerates files vanishing underneath it.

pub mod retention;
pub mod usage;

pub use retention::{enforce_budget, retention_loop, RetentionPolicy};
pub use usage::{directory_usage, oldest_segment, parse_segment_timestamp, StoreError, SEGMENT_EXT};
