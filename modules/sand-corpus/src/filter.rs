// Client-side filtering for ad-hoc queries.
// The profile scraper cannot search by topic or date, so queries over-fetch
// and narrow the result here.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::info;

use sand_common::QueryTweet;

use crate::normalize::{self, FieldAliases};

/// Text fields the topic filter searches.
pub const TOPIC_TEXT: FieldAliases = FieldAliases(&["/text", "/full_text"]);
pub const CREATED_AT: FieldAliases = FieldAliases(&["/created_at", "/createdAt"]);

/// Items fetched when a topic is set; topic matches are sparse.
pub const TOPIC_FETCH_LIMIT: u32 = 3000;
/// Items fetched when only a date range is set.
pub const DATE_FETCH_LIMIT: u32 = 1000;
/// Items fetched for an unfiltered "all tweets" query.
pub const DEFAULT_FETCH_LIMIT: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    pub topic: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Zero keeps everything.
    pub limit: u32,
}

impl QueryFilter {
    pub fn new(topic: Option<&str>, from: Option<NaiveDate>, to: Option<NaiveDate>, limit: u32) -> Self {
        let topic = topic
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self {
            topic,
            from,
            to,
            limit,
        }
    }

    pub fn has_date_range(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// How many items to request upstream before filtering.
    pub fn fetch_limit(&self) -> u32 {
        if self.topic.is_some() {
            TOPIC_FETCH_LIMIT
        } else if self.has_date_range() {
            DATE_FETCH_LIMIT
        } else if self.limit == 0 {
            DEFAULT_FETCH_LIMIT
        } else {
            self.limit
        }
    }

    pub fn matches_topic(&self, item: &Value) -> bool {
        let Some(topic) = &self.topic else {
            return true;
        };
        let text = TOPIC_TEXT.resolve(item).unwrap_or_default();
        text.to_lowercase().contains(&topic.to_lowercase())
    }

    /// `from` is inclusive from midnight UTC; `to` includes the whole end day.
    /// Undated items never match an active bound.
    pub fn within_dates(&self, item: &Value) -> bool {
        if !self.has_date_range() {
            return true;
        }
        let Some(created) = CREATED_AT.resolve(item).and_then(|raw| parse_tweet_date(&raw)) else {
            return false;
        };
        if let Some(start) = self.from.and_then(day_start) {
            if created < start {
                return false;
            }
        }
        if let Some(end) = self.to.and_then(|d| d.succ_opt()).and_then(day_start) {
            if created >= end {
                return false;
            }
        }
        true
    }

    /// Topic, then dates, then limit, preserving upstream order.
    pub fn apply(&self, items: Vec<Value>) -> Vec<Value> {
        let mut items = items;

        if let Some(topic) = &self.topic {
            items.retain(|item| self.matches_topic(item));
            info!(count = items.len(), topic = %topic, "Filtered to topic matches");
        }

        if self.has_date_range() {
            items.retain(|item| self.within_dates(item));
            info!(count = items.len(), "Filtered to date range");
        }

        if self.limit > 0 {
            items.truncate(self.limit as usize);
        }

        items
    }
}

/// Parse the date formats the Twitter scrapers emit.
pub fn parse_tweet_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y"))
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Project a raw item into a query output row.
pub fn to_query_tweet(item: &Value, handle: &str) -> QueryTweet {
    let id = normalize::resolve_id(item);
    let url = item
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://twitter.com/{handle}/status/{id}"));

    QueryTweet {
        text: TOPIC_TEXT.resolve(item).unwrap_or_default(),
        date: CREATED_AT.resolve(item),
        url,
        id,
    }
}

fn day_start(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
