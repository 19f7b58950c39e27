//! The data side of sand: map raw scraper items into [`TweetRecord`]s, filter
//! ad-hoc query results, and merge per-window batch files into one corpus.
//!
//! [`TweetRecord`]: sand_common::TweetRecord

pub mod atomic;
pub mod filter;
pub mod merge;
pub mod normalize;

pub use atomic::write_atomic;
pub use filter::QueryFilter;
pub use merge::{
    BatchMerger, BatchReadError, BatchStats, IdOrdering, MergeError, MergeSummary, SkippedBatch,
};
pub use normalize::{is_synthesized, normalize, normalize_all, FieldAliases};
