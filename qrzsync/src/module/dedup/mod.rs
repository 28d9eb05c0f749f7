///! Upload dedup cache
///!
///! Remembers SHA-256 digests of raw record lines that were already
///! uploaded, so re-running over the same log skips them.

pub mod cache;

pub use cache::{DedupCache, record_digest};
