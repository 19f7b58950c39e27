use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use sand_common::{QueryResult, SandError};
use sand_corpus::filter::to_query_tweet;
use sand_corpus::QueryFilter;

use crate::source::TweetSource;

/// Limit used when a query does not ask for one.
pub const DEFAULT_QUERY_LIMIT: u32 = 100;

/// Ad-hoc profile queries: over-fetch from the profile scraper, filter locally.
pub struct QueryCollector<S> {
    source: S,
}

impl<S: TweetSource> QueryCollector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn run(&self, handle: &str, filter: &QueryFilter) -> Result<QueryResult, SandError> {
        let handle = handle.trim().trim_start_matches('@');
        if handle.is_empty() {
            return Err(SandError::Validation("no handle provided".to_string()));
        }

        let fetch_limit = filter.fetch_limit();
        info!(
            handle,
            topic = filter.topic.as_deref().unwrap_or("-"),
            fetch_limit,
            limit = filter.limit,
            "Collecting profile tweets"
        );

        let items = self
            .source
            .profile_tweets(handle, fetch_limit)
            .await
            .map_err(|e| {
                warn!(handle, error = %e, "Profile scrape failed");
                SandError::Scraping(e.to_string())
            })?;
        info!(handle, count = items.len(), "Fetched profile tweets");

        let tweets = filter
            .apply(items)
            .iter()
            .map(|item| to_query_tweet(item, handle))
            .collect();

        Ok(QueryResult {
            handle: handle.to_string(),
            topic: filter.topic.clone(),
            from: filter.from.map(format_date),
            to: filter.to.map(format_date),
            collected_at: Utc::now(),
            tweets,
        })
    }
}

/// `YYYY-MM-DD`; blank means unbounded.
pub fn parse_query_date(raw: Option<&str>) -> Result<Option<NaiveDate>, SandError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| SandError::Validation(format!("invalid date {s:?}, expected YYYY-MM-DD"))),
    }
}

/// A count, or `all` / `0` for no limit. Missing means the default of 100.
pub fn parse_query_limit(raw: Option<&str>) -> Result<u32, SandError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(DEFAULT_QUERY_LIMIT),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(0),
        Some(s) => s
            .parse()
            .map_err(|_| SandError::Validation(format!("invalid limit {s:?}"))),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
