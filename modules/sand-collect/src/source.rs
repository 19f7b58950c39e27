// Network seam for collectors. ApifyClient in production, fakes in tests.

use anyhow::Result;
use apify_client::{ApifyClient, RunOptions};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Raw items for one twitter.com search URL.
    async fn search_window(&self, search_url: &str, options: &RunOptions) -> Result<Vec<Value>>;

    /// The most recent `limit` raw items of one profile.
    async fn profile_tweets(&self, handle: &str, limit: u32) -> Result<Vec<Value>>;
}

#[async_trait]
impl TweetSource for ApifyClient {
    async fn search_window(&self, search_url: &str, options: &RunOptions) -> Result<Vec<Value>> {
        Ok(self.search_tweets(search_url, options).await?)
    }

    async fn profile_tweets(&self, handle: &str, limit: u32) -> Result<Vec<Value>> {
        Ok(ApifyClient::profile_tweets(self, handle, limit).await?)
    }
}
