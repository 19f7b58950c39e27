use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Literal prefix that marks a retweet in normalized content.
pub const RETWEET_PREFIX: &str = "RT @";

/// Date-range label reported for batches that do not declare one.
pub const UNKNOWN_DATE_RANGE: &str = "Unknown";

// --- Normalized records ---

/// The canonical shape every scraper output is mapped into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub id: String,
    /// Parent tweet in a reply chain; `null` for standalone tweets.
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl TweetRecord {
    pub fn is_retweet(&self) -> bool {
        self.content.starts_with(RETWEET_PREFIX)
    }
}

/// Reporting bucket for a record. Every record lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Retweet,
    ThreadReply,
    Original,
}

impl ContentKind {
    /// Retweet wins over thread reply, which wins over original.
    pub fn of(record: &TweetRecord) -> Self {
        if record.is_retweet() {
            ContentKind::Retweet
        } else if record.thread_id.is_some() {
            ContentKind::ThreadReply
        } else {
            ContentKind::Original
        }
    }
}

// --- Batch files ---

/// Reporting-only header of a batch file. Every field falls back to its
/// default when absent, null or malformed; only `tweets` decides whether a
/// batch is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub batch_name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub date_range: String,
    #[serde(default, deserialize_with = "lenient")]
    pub total_collected: usize,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One collection run's output for one date window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFile {
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: BatchMetadata,
    pub tweets: Vec<TweetRecord>,
}

/// Any well-formed JSON value is accepted; one that does not fit `T` becomes `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl BatchFile {
    pub fn new(batch_name: &str, date_range: &str, tweets: Vec<TweetRecord>) -> Self {
        Self {
            metadata: BatchMetadata {
                batch_name: batch_name.to_string(),
                date_range: date_range.to_string(),
                total_collected: tweets.len(),
                timestamp: Some(Utc::now()),
            },
            tweets,
        }
    }

    /// The declared date range, or "Unknown" when the batch left it blank.
    pub fn date_range_label(&self) -> &str {
        if self.metadata.date_range.is_empty() {
            UNKNOWN_DATE_RANGE
        } else {
            &self.metadata.date_range
        }
    }
}

// --- Merged corpus ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBreakdown {
    pub original_tweets: usize,
    pub retweets: usize,
    pub thread_replies: usize,
}

impl ContentBreakdown {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a TweetRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut acc, record| {
                match ContentKind::of(record) {
                    ContentKind::Retweet => acc.retweets += 1,
                    ContentKind::ThreadReply => acc.thread_replies += 1,
                    ContentKind::Original => acc.original_tweets += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.original_tweets + self.retweets + self.thread_replies
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusMetadata {
    pub total_tweets: usize,
    pub unique_tweets: usize,
    pub duplicates_removed: usize,
    pub batches_merged: usize,
    pub date_merged: DateTime<Utc>,
    pub content_breakdown: ContentBreakdown,
}

/// The deduplicated, sorted union of every batch file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedCorpus {
    pub metadata: CorpusMetadata,
    pub tweets: Vec<TweetRecord>,
}

// --- Ad-hoc queries ---

/// One row of an ad-hoc query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTweet {
    pub id: String,
    pub text: String,
    pub date: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub handle: String,
    pub topic: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub collected_at: DateTime<Utc>,
    pub tweets: Vec<QueryTweet>,
}
