// Batch collection: one search run per window, one batch file per window.
// Windows already on disk are skipped, so an interrupted run resumes where it
// stopped. A failing window is logged and the run moves on.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use apify_client::RunOptions;
use tracing::{info, warn};

use sand_common::{BatchFile, SandError};
use sand_corpus::merge::read_batch;
use sand_corpus::{normalize_all, write_atomic};

use crate::plan::BatchWindow;
use crate::source::TweetSource;

/// Approximate scraper pricing: $0.40 per 1000 tweets.
pub const COST_PER_TWEET_USD: f64 = 0.0004;

#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    /// A non-empty batch file was already on disk.
    Existing(usize),
    Collected(usize),
    Failed(String),
}

impl WindowOutcome {
    pub fn tweets(&self) -> usize {
        match self {
            WindowOutcome::Existing(n) | WindowOutcome::Collected(n) => *n,
            WindowOutcome::Failed(_) => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowReport {
    pub window: BatchWindow,
    pub outcome: WindowOutcome,
}

#[derive(Debug, Clone)]
pub struct CollectReport {
    pub windows: Vec<WindowReport>,
    pub elapsed: Duration,
    pub batch_dir: PathBuf,
}

impl CollectReport {
    /// Windows that contributed at least one tweet.
    pub fn successful(&self) -> usize {
        self.windows
            .iter()
            .filter(|w| w.outcome.tweets() > 0)
            .count()
    }

    pub fn total_tweets(&self) -> usize {
        self.windows.iter().map(|w| w.outcome.tweets()).sum()
    }

    pub fn estimated_cost_usd(&self) -> f64 {
        self.total_tweets() as f64 * COST_PER_TWEET_USD
    }
}

pub struct BatchCollector<S> {
    source: S,
    handle: String,
    batch_dir: PathBuf,
    delay: Duration,
    options: RunOptions,
}

impl<S: TweetSource> BatchCollector<S> {
    pub fn new(source: S, handle: impl Into<String>, batch_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            handle: handle.into(),
            batch_dir: batch_dir.into(),
            delay: Duration::from_secs(5),
            options: RunOptions::search_defaults(),
        }
    }

    /// Pause between windows, to stay clear of scraper rate limits.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn batch_path(&self, window: &BatchWindow) -> PathBuf {
        self.batch_dir.join(&window.file_name)
    }

    /// Collect every window in order. Only a batch directory that cannot be
    /// created is fatal.
    pub async fn run(&self, windows: &[BatchWindow]) -> Result<CollectReport, SandError> {
        fs::create_dir_all(&self.batch_dir)?;
        info!(
            handle = %self.handle,
            windows = windows.len(),
            batch_dir = %self.batch_dir.display(),
            "Starting batch collection"
        );

        let started = Instant::now();
        let mut reports = Vec::with_capacity(windows.len());
        let mut running_total = 0;

        for (i, window) in windows.iter().enumerate() {
            info!(batch = i + 1, of = windows.len(), window = %window.name, "Collecting window");

            let outcome = match self.collect_window(window).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let message = format!("{e:#}");
                    warn!(window = %window.name, error = %message, "Window failed, continuing");
                    WindowOutcome::Failed(message)
                }
            };
            running_total += outcome.tweets();
            info!(window = %window.name, tweets = outcome.tweets(), running_total, "Window done");

            reports.push(WindowReport {
                window: window.clone(),
                outcome,
            });

            if i + 1 < windows.len() && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        let report = CollectReport {
            windows: reports,
            elapsed: started.elapsed(),
            batch_dir: self.batch_dir.clone(),
        };
        info!(
            successful = report.successful(),
            windows = windows.len(),
            total_tweets = report.total_tweets(),
            "Batch collection complete"
        );
        Ok(report)
    }

    async fn collect_window(&self, window: &BatchWindow) -> anyhow::Result<WindowOutcome> {
        let path = self.batch_path(window);
        if let Some(count) = existing_tweet_count(&path) {
            info!(window = %window.name, count, "Batch already collected");
            return Ok(WindowOutcome::Existing(count));
        }

        let search_url = window.search_url(&self.handle);
        let items = self
            .source
            .search_window(&search_url, &self.options)
            .await
            .with_context(|| format!("search for {} failed", window.name))?;
        info!(window = %window.name, count = items.len(), "Received items");

        let batch = BatchFile::new(&window.name, &window.date_range(), normalize_all(&items));
        let json = serde_json::to_vec_pretty(&batch)?;
        write_atomic(&path, &json).with_context(|| format!("writing {}", path.display()))?;
        info!(file = %window.file_name, count = batch.tweets.len(), "Saved batch");

        Ok(WindowOutcome::Collected(batch.tweets.len()))
    }
}

/// Tweet count of a readable, non-empty batch file. Anything else is recollected.
fn existing_tweet_count(path: &Path) -> Option<usize> {
    if !path.exists() {
        return None;
    }
    match read_batch(path) {
        Ok(batch) if !batch.tweets.is_empty() => Some(batch.tweets.len()),
        Ok(_) => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Existing batch unreadable, recollecting");
            None
        }
    }
}
