//! Collection against the Apify tweet scrapers.
//!
//! [`BatchCollector`] walks a quarterly [`BatchWindow`] plan and writes one
//! batch file per window; [`QueryCollector`] answers ad-hoc profile queries.
//! Both talk to the network only through [`TweetSource`].

pub mod collector;
pub mod plan;
pub mod query;
pub mod source;

pub use collector::{BatchCollector, CollectReport, WindowOutcome, WindowReport};
pub use plan::{quarterly_windows, BatchWindow};
pub use query::{parse_query_date, parse_query_limit, QueryCollector};
pub use source::TweetSource;
