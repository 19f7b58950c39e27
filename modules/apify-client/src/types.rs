use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Query options accepted by `POST /acts/{actor}/runs`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Memory limit in megabytes.
    pub memory_mbytes: Option<u32>,
    /// Build tag or number, e.g. "latest".
    pub build: Option<String>,
    /// Run timeout in seconds. Zero means no timeout.
    pub timeout_secs: Option<u64>,
}

impl RunOptions {
    /// Options the search collector has always used: 512 MB, latest build, no timeout.
    pub fn search_defaults() -> Self {
        Self {
            memory_mbytes: Some(512),
            build: Some("latest".to_string()),
            timeout_secs: Some(0),
        }
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(memory) = self.memory_mbytes {
            pairs.push(("memory", memory.to_string()));
        }
        if let Some(build) = &self.build {
            pairs.push(("build", build.clone()));
        }
        if let Some(timeout) = self.timeout_secs {
            pairs.push(("timeout", timeout.to_string()));
        }
        pairs
    }
}

/// Input for the apidojo/tweet-scraper actor driven by a search URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetSearchInput {
    pub start_urls: Vec<String>,
    pub search_terms: Vec<String>,
    pub twitter_handles: Vec<String>,
    pub conversation_ids: Vec<String>,
    pub include_user_info: bool,
    pub add_user_info: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
}

impl TweetSearchInput {
    /// A search over a single twitter.com search URL, with user info attached.
    pub fn for_url(search_url: impl Into<String>) -> Self {
        Self {
            start_urls: vec![search_url.into()],
            search_terms: Vec::new(),
            twitter_handles: Vec::new(),
            conversation_ids: Vec::new(),
            include_user_info: true,
            add_user_info: true,
            max_items: None,
        }
    }
}

/// Input for the quacker/twitter-scraper profile actor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetProfileInput {
    pub handles: Vec<String>,
    pub tweets_desired: u32,
    pub include_retweets: bool,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Account plan, as reported by `/users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// The account that owns the API token.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: Option<String>,
    pub username: Option<String>,
    pub plan: Option<Plan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_input_uses_actor_field_names() {
        let input = TweetSearchInput::for_url("https://twitter.com/search?q=from:sand");
        let json = serde_json::to_value(&input).unwrap();

        assert_eq!(json["startUrls"][0], "https://twitter.com/search?q=from:sand");
        assert_eq!(json["includeUserInfo"], true);
        assert_eq!(json["conversationIds"], serde_json::json!([]));
        assert!(json.get("maxItems").is_none());
    }

    #[test]
    fn profile_input_uses_actor_field_names() {
        let input = TweetProfileInput {
            handles: vec!["sand".to_string()],
            tweets_desired: 3000,
            include_retweets: true,
        };
        let json = serde_json::to_value(&input).unwrap();

        assert_eq!(json["tweetsDesired"], 3000);
        assert_eq!(json["includeRetweets"], true);
    }

    #[test]
    fn search_defaults_render_as_query_pairs() {
        let pairs = RunOptions::search_defaults().query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("memory", "512".to_string()),
                ("build", "latest".to_string()),
                ("timeout", "0".to_string()),
            ]
        );
        assert!(RunOptions::default().query_pairs().is_empty());
    }

    #[test]
    fn user_info_tolerates_missing_plan() {
        let user: UserInfo = serde_json::from_str(r#"{"id":"abc","username":"sand"}"#).unwrap();
        assert_eq!(user.username.as_deref(), Some("sand"));
        assert!(user.plan.is_none());
    }
}
