pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    Plan, RunData, RunOptions, TweetProfileInput, TweetSearchInput, UserInfo,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for apidojo/tweet-scraper (search URL driven).
pub const TWEET_SEARCH_SCRAPER: &str = "apidojo~tweet-scraper";

/// Actor ID for quacker/twitter-scraper (profile driven).
pub const TWEET_PROFILE_SCRAPER: &str = "quacker~twitter-scraper";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (a proxy or a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(
        &self,
        actor_id: &str,
        input: &I,
        options: &RunOptions,
    ) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&options.query_pairs())
            .json(input)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let resp = ensure_success(resp).await?;
            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed {
                        run_id: run_id.to_string(),
                        status: api_resp.data.status,
                    });
                }
                _ => {
                    tracing::debug!(run_id, status = %api_resp.data.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Run an actor end-to-end: start, poll, fetch the default dataset as raw JSON.
    pub async fn call_actor<I: Serialize>(
        &self,
        actor_id: &str,
        input: &I,
        options: &RunOptions,
    ) -> Result<Vec<Value>> {
        let run = self.start_run(actor_id, input, options).await?;
        tracing::info!(actor_id, run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let items: Vec<Value> = self
            .get_dataset_items(&completed.default_dataset_id)
            .await?;
        tracing::info!(count = items.len(), "Fetched dataset items");

        Ok(items)
    }

    /// Scrape tweets matching a twitter.com search URL.
    pub async fn search_tweets(
        &self,
        search_url: &str,
        options: &RunOptions,
    ) -> Result<Vec<Value>> {
        tracing::info!(search_url, "Starting X/Twitter search scrape");
        let input = TweetSearchInput::for_url(search_url);
        self.call_actor(TWEET_SEARCH_SCRAPER, &input, options).await
    }

    /// Scrape the most recent tweets of one profile, retweets included.
    pub async fn profile_tweets(&self, handle: &str, limit: u32) -> Result<Vec<Value>> {
        tracing::info!(handle, limit, "Starting X/Twitter profile scrape");
        let input = TweetProfileInput {
            handles: vec![handle.to_string()],
            tweets_desired: limit,
            include_retweets: true,
        };
        let options = RunOptions {
            timeout_secs: Some(300),
            ..RunOptions::default()
        };
        self.call_actor(TWEET_PROFILE_SCRAPER, &input, &options).await
    }

    /// Fetch the account that owns the token. Doubles as a connectivity check.
    pub async fn get_user(&self) -> Result<UserInfo> {
        let url = format!("{}/users/me", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let api_resp: ApiResponse<UserInfo> = resp.json().await?;
        Ok(api_resp.data)
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApifyError::Api {
        status: status.as_u16(),
        message: body,
    })
}
