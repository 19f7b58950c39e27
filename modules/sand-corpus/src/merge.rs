//! Batch merging.
//!
//! Reads every batch file in a directory in file-name order, keeps the first
//! occurrence of each tweet id, orders the union newest-first and writes one
//! [`MergedCorpus`]. A batch that cannot be read is logged and skipped; the
//! run only fails when the directory is missing or yields no readable batch.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use sand_common::{BatchFile, ContentBreakdown, CorpusMetadata, MergedCorpus, TweetRecord};

use crate::atomic::write_atomic;
use crate::normalize::is_synthesized;

const BATCH_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("batch directory {} does not exist", .0.display())]
    BatchDirMissing(PathBuf),

    #[error("no batch files found in {}", .0.display())]
    NoBatchFiles(PathBuf),

    #[error("none of the {count} batch files in {} could be read", .dir.display())]
    NoValidBatches { dir: PathBuf, count: usize },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize merged corpus: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl MergeError {
    /// Operator hint for the conditions that mean "nothing has been collected yet".
    pub fn remedy(&self) -> Option<&'static str> {
        match self {
            MergeError::BatchDirMissing(_)
            | MergeError::NoBatchFiles(_)
            | MergeError::NoValidBatches { .. } => {
                Some("Run `sand collect` first to collect tweets in batches")
            }
            _ => None,
        }
    }
}

/// Why a single batch file contributed nothing.
#[derive(Debug, Error)]
pub enum BatchReadError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    #[error("not a batch file: {0}")]
    Json(#[from] serde_json::Error),
}

/// How ids are compared when ordering the corpus newest-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdOrdering {
    /// Plain string comparison. Ids of different digit lengths misorder:
    /// "9" sorts above "100".
    #[default]
    Lexicographic,
    /// Digit-only ids compare by magnitude and rank above any other id;
    /// the rest fall back to string comparison.
    Numeric,
}

impl IdOrdering {
    /// Ascending comparison; the merger sorts by the reverse of this.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            IdOrdering::Lexicographic => a.cmp(b),
            IdOrdering::Numeric => match (digits(a), digits(b)) {
                (Some(x), Some(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => a.cmp(b),
            },
        }
    }

    /// Sort newest-first under this ordering.
    pub fn sort_descending(&self, tweets: &mut [TweetRecord]) {
        tweets.sort_by(|a, b| self.compare(&b.id, &a.id));
    }
}

impl FromStr for IdOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lexicographic" | "string" => Ok(IdOrdering::Lexicographic),
            "numeric" => Ok(IdOrdering::Numeric),
            other => Err(format!(
                "unknown id ordering {other:?} (expected lexicographic or numeric)"
            )),
        }
    }
}

impl fmt::Display for IdOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdOrdering::Lexicographic => f.write_str("lexicographic"),
            IdOrdering::Numeric => f.write_str("numeric"),
        }
    }
}

fn digits(id: &str) -> Option<&str> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(id.trim_start_matches('0'))
}

/// Per-file contribution to the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub file: String,
    pub total: usize,
    pub unique: usize,
    pub duplicates: usize,
    pub date_range: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBatch {
    pub file: String,
    pub reason: String,
}

/// What a merge run produced, for display.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub metadata: CorpusMetadata,
    pub batches: Vec<BatchStats>,
    pub skipped: Vec<SkippedBatch>,
    /// Records read across every readable batch, duplicates included.
    pub input_records: usize,
    /// Records whose id was synthesized at collection time. These never
    /// dedup against a later run.
    pub synthesized_ids: usize,
    pub output_path: PathBuf,
    pub output_bytes: u64,
}

/// One discovered file, read or failed.
pub struct LoadedBatch {
    pub file: String,
    pub batch: Result<BatchFile, BatchReadError>,
}

/// Running state of one merge. The seen-id set only grows and is never
/// shared between runs.
#[derive(Debug, Default)]
struct MergeAccumulator {
    seen: HashSet<String>,
    tweets: Vec<TweetRecord>,
    duplicates: usize,
    input_records: usize,
    batches: Vec<BatchStats>,
    skipped: Vec<SkippedBatch>,
}

impl MergeAccumulator {
    fn ingest(mut self, loaded: LoadedBatch) -> Self {
        info!(file = %loaded.file, "Reading batch");

        let batch = match loaded.batch {
            Ok(batch) => batch,
            Err(e) => {
                warn!(file = %loaded.file, error = %e, "Skipping unreadable batch");
                self.skipped.push(SkippedBatch {
                    file: loaded.file,
                    reason: e.to_string(),
                });
                return self;
            }
        };

        let date_range = batch.date_range_label().to_string();
        let total = batch.tweets.len();
        let mut unique = 0;
        let mut duplicates = 0;

        for tweet in batch.tweets {
            if self.seen.insert(tweet.id.clone()) {
                self.tweets.push(tweet);
                unique += 1;
            } else {
                duplicates += 1;
            }
        }

        info!(file = %loaded.file, unique, duplicates, "Added unique tweets");

        self.input_records += total;
        self.duplicates += duplicates;
        self.batches.push(BatchStats {
            file: loaded.file,
            total,
            unique,
            duplicates,
            date_range,
        });
        self
    }
}

/// Everything a merge computes before anything is written.
#[derive(Debug)]
pub struct Merged {
    pub corpus: MergedCorpus,
    pub batches: Vec<BatchStats>,
    pub skipped: Vec<SkippedBatch>,
    pub input_records: usize,
}

/// Fold loaded batches into one sorted, summarized corpus. First occurrence
/// of an id wins, so input order decides which copy is kept.
pub fn merge(batches: impl IntoIterator<Item = LoadedBatch>, ordering: IdOrdering) -> Merged {
    let acc = batches
        .into_iter()
        .fold(MergeAccumulator::default(), MergeAccumulator::ingest);

    let mut tweets = acc.tweets;
    ordering.sort_descending(&mut tweets);

    let content_breakdown = ContentBreakdown::tally(&tweets);
    let metadata = CorpusMetadata {
        total_tweets: tweets.len(),
        unique_tweets: tweets.len(),
        duplicates_removed: acc.duplicates,
        batches_merged: acc.batches.len(),
        date_merged: Utc::now(),
        content_breakdown,
    };

    Merged {
        corpus: MergedCorpus { metadata, tweets },
        batches: acc.batches,
        skipped: acc.skipped,
        input_records: acc.input_records,
    }
}

pub fn read_batch(path: &Path) -> Result<BatchFile, BatchReadError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Merges a batch directory into a corpus file.
#[derive(Debug, Clone)]
pub struct BatchMerger {
    batch_dir: PathBuf,
    output_path: PathBuf,
    ordering: IdOrdering,
}

impl BatchMerger {
    pub fn new(batch_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            batch_dir: batch_dir.into(),
            output_path: output_path.into(),
            ordering: IdOrdering::default(),
        }
    }

    pub fn with_ordering(mut self, ordering: IdOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn batch_dir(&self) -> &Path {
        &self.batch_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Batch files in the directory, sorted by file name.
    pub fn discover(&self) -> Result<Vec<PathBuf>, MergeError> {
        if !self.batch_dir.is_dir() {
            return Err(MergeError::BatchDirMissing(self.batch_dir.clone()));
        }

        let io_err = |source| MergeError::Io {
            path: self.batch_dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.batch_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_batch = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == BATCH_EXTENSION);
            if is_batch {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Discover, ingest, sort, summarize, persist. Nothing is written unless
    /// at least one batch was readable.
    pub fn run(&self) -> Result<MergeSummary, MergeError> {
        info!(batch_dir = %self.batch_dir.display(), "Batch merge starting");

        let files = self.discover()?;
        if files.is_empty() {
            return Err(MergeError::NoBatchFiles(self.batch_dir.clone()));
        }
        info!(count = files.len(), "Found batch files to merge");

        let loaded = files.iter().map(|path| LoadedBatch {
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            batch: read_batch(path),
        });
        let merged = merge(loaded, self.ordering);

        if merged.batches.is_empty() {
            return Err(MergeError::NoValidBatches {
                dir: self.batch_dir.clone(),
                count: files.len(),
            });
        }

        let synthesized_ids = merged
            .corpus
            .tweets
            .iter()
            .filter(|t| is_synthesized(&t.id))
            .count();
        if synthesized_ids > 0 {
            warn!(count = synthesized_ids, "Corpus holds records without an upstream id");
        }

        let output_bytes = persist(&merged.corpus, &self.output_path)?;
        info!(
            path = %self.output_path.display(),
            unique = merged.corpus.metadata.unique_tweets,
            duplicates = merged.corpus.metadata.duplicates_removed,
            "Merged corpus saved"
        );

        Ok(MergeSummary {
            metadata: merged.corpus.metadata,
            batches: merged.batches,
            skipped: merged.skipped,
            input_records: merged.input_records,
            synthesized_ids,
            output_path: self.output_path.clone(),
            output_bytes,
        })
    }
}

/// Pretty JSON plus a trailing newline, replaced atomically.
fn persist(corpus: &MergedCorpus, path: &Path) -> Result<u64, MergeError> {
    let mut bytes = serde_json::to_vec_pretty(corpus)?;
    bytes.push(b'\n');
    write_atomic(path, &bytes).map_err(|source| MergeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, thread_id: Option<&str>, content: &str) -> TweetRecord {
        TweetRecord {
            id: id.to_string(),
            thread_id: thread_id.map(str::to_string),
            content: content.to_string(),
        }
    }

    fn loaded(file: &str, tweets: Vec<TweetRecord>) -> LoadedBatch {
        LoadedBatch {
            file: file.to_string(),
            batch: Ok(BatchFile::new(file, "2024-01-01 to 2024-03-31", tweets)),
        }
    }

    fn ids(tweets: &[TweetRecord]) -> Vec<&str> {
        tweets.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn lexicographic_descending_misorders_lengths() {
        let mut tweets = vec![record("10", None, ""), record("9", None, ""), record("100", None, "")];
        IdOrdering::Lexicographic.sort_descending(&mut tweets);
        assert_eq!(ids(&tweets), vec!["9", "100", "10"]);
    }

    #[test]
    fn numeric_descending_orders_by_magnitude() {
        let mut tweets = vec![
            record("10", None, ""),
            record("unknown_1_0.5", None, ""),
            record("9", None, ""),
            record("100", None, ""),
        ];
        IdOrdering::Numeric.sort_descending(&mut tweets);
        assert_eq!(ids(&tweets), vec!["100", "10", "9", "unknown_1_0.5"]);
    }

    #[test]
    fn numeric_ignores_leading_zeros() {
        assert_eq!(IdOrdering::Numeric.compare("007", "7"), Ordering::Equal);
        assert_eq!(IdOrdering::Numeric.compare("0010", "9"), Ordering::Greater);
    }

    #[test]
    fn ordering_parses_from_flags() {
        assert_eq!("numeric".parse::<IdOrdering>(), Ok(IdOrdering::Numeric));
        assert_eq!("Lexicographic".parse::<IdOrdering>(), Ok(IdOrdering::Lexicographic));
        assert!("chronological".parse::<IdOrdering>().is_err());
    }

    #[test]
    fn first_occurrence_wins_across_batches() {
        let merged = merge(
            vec![
                loaded("a.json", vec![record("1", None, "first copy")]),
                loaded("b.json", vec![record("1", None, "second copy"), record("2", None, "x")]),
            ],
            IdOrdering::Lexicographic,
        );

        let kept = merged.corpus.tweets.iter().find(|t| t.id == "1").unwrap();
        assert_eq!(kept.content, "first copy");
        assert_eq!(merged.corpus.metadata.duplicates_removed, 1);
        assert_eq!(merged.batches[1].duplicates, 1);
        assert_eq!(merged.batches[1].unique, 1);
    }

    #[test]
    fn duplicates_within_one_batch_are_dropped() {
        let merged = merge(
            vec![loaded("a.json", vec![record("1", None, "a"), record("1", None, "b")])],
            IdOrdering::Lexicographic,
        );
        assert_eq!(merged.corpus.tweets.len(), 1);
        assert_eq!(merged.batches[0].duplicates, 1);
    }

    #[test]
    fn unreadable_batch_contributes_nothing() {
        let bad = LoadedBatch {
            file: "broken.json".to_string(),
            batch: Err(BatchReadError::Json(
                serde_json::from_str::<BatchFile>("{").unwrap_err(),
            )),
        };
        let merged = merge(
            vec![bad, loaded("ok.json", vec![record("1", None, "a")])],
            IdOrdering::Lexicographic,
        );

        assert_eq!(merged.skipped.len(), 1);
        assert_eq!(merged.skipped[0].file, "broken.json");
        assert_eq!(merged.batches.len(), 1);
        assert_eq!(merged.corpus.metadata.batches_merged, 1);
        assert_eq!(merged.corpus.tweets.len(), 1);
    }

    #[test]
    fn unique_count_is_input_minus_duplicates() {
        let merged = merge(
            vec![
                loaded("a.json", vec![record("1", None, ""), record("2", None, ""), record("3", None, "")]),
                loaded("b.json", vec![record("3", None, ""), record("4", None, "")]),
                loaded("c.json", vec![record("1", None, ""), record("4", None, ""), record("5", None, "")]),
            ],
            IdOrdering::Lexicographic,
        );
        let meta = &merged.corpus.metadata;
        assert_eq!(merged.input_records, 8);
        assert_eq!(meta.duplicates_removed, 3);
        assert_eq!(meta.unique_tweets, merged.input_records - meta.duplicates_removed);
        assert_eq!(meta.total_tweets, meta.unique_tweets);
    }

    #[test]
    fn breakdown_buckets_are_exclusive() {
        let merged = merge(
            vec![loaded(
                "a.json",
                vec![
                    record("1", Some("0"), "RT @x: threaded retweet"),
                    record("2", Some("1"), "a reply"),
                    record("3", None, "standalone"),
                ],
            )],
            IdOrdering::Lexicographic,
        );
        let breakdown = merged.corpus.metadata.content_breakdown;
        assert_eq!(breakdown.retweets, 1);
        assert_eq!(breakdown.thread_replies, 1);
        assert_eq!(breakdown.original_tweets, 1);
    }

    #[test]
    fn remedy_points_at_collection() {
        assert!(MergeError::NoBatchFiles(PathBuf::from("x")).remedy().is_some());
        let io = MergeError::Io {
            path: PathBuf::from("x"),
            source: io::Error::new(io::ErrorKind::Other, "disk"),
        };
        assert!(io.remedy().is_none());
    }
}
