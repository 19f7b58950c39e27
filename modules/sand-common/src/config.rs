use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::SandError;

/// Value shipped in the sample `.env`; treated the same as an unset token.
const PLACEHOLDER_TOKEN: &str = "your_apify_api_token_here";

const DEFAULT_BATCH_DIR: &str = "data/raw/batches";
const DEFAULT_CORPUS_PATH: &str = "data/raw/complete.json";
const DEFAULT_COLLECT_SINCE: &str = "2020-01-01";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Apify
    pub apify_token: String,

    // Collection
    pub twitter_handle: String,
    pub collect_since: String,
    pub batch_delay: Duration,

    // Storage
    pub batch_dir: PathBuf,
    pub corpus_path: PathBuf,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration for the batch collector. The token is required; the
    /// handle comes from `handle` when given, else from `TWITTER_HANDLE`.
    pub fn collector_from_env(handle: Option<&str>) -> Result<Self, SandError> {
        dotenvy::dotenv().ok();
        Self::collector_from_lookup(|key| env::var(key).ok(), handle)
    }

    /// Load a minimal config for the merger (local files only, no token needed).
    pub fn merge_from_env() -> Result<Self, SandError> {
        dotenvy::dotenv().ok();
        Self::base_from_lookup(|key| env::var(key).ok())
    }

    /// Load config for ad-hoc queries and the web server (token, no fixed handle).
    pub fn web_from_env() -> Result<Self, SandError> {
        dotenvy::dotenv().ok();
        Self::web_from_lookup(|key| env::var(key).ok())
    }

    pub fn collector_from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        handle: Option<&str>,
    ) -> Result<Self, SandError> {
        let mut config = Self::web_from_lookup(&lookup)?;
        let handle = handle
            .map(normalize_handle)
            .filter(|h| !h.is_empty())
            .or_else(|| lookup("TWITTER_HANDLE").map(|h| normalize_handle(&h)))
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                SandError::Config(
                    "TWITTER_HANDLE environment variable or --handle is required".to_string(),
                )
            })?;
        config.twitter_handle = handle;
        Ok(config)
    }

    pub fn web_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SandError> {
        let mut config = Self::base_from_lookup(&lookup)?;
        config.apify_token = apify_token(&lookup)?;
        Ok(config)
    }

    pub fn base_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SandError> {
        let delay_secs = match lookup("SAND_BATCH_DELAY_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                SandError::Config(format!("SAND_BATCH_DELAY_SECS must be a number, got {raw:?}"))
            })?,
            None => 5,
        };
        let web_port = match lookup("WEB_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| SandError::Config(format!("WEB_PORT must be a number, got {raw:?}")))?,
            None => 3847,
        };

        Ok(Self {
            apify_token: String::new(),
            twitter_handle: String::new(),
            collect_since: lookup("SAND_COLLECT_SINCE")
                .unwrap_or_else(|| DEFAULT_COLLECT_SINCE.to_string()),
            batch_delay: Duration::from_secs(delay_secs),
            batch_dir: lookup("SAND_BATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BATCH_DIR)),
            corpus_path: lookup("SAND_CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_PATH)),
            web_host: lookup("WEB_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            web_port,
        })
    }

    /// Log the loaded configuration without leaking the token.
    pub fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            if val.is_empty() {
                return "<not set>".to_string();
            }
            let head: String = val.chars().take(5).collect();
            format!("{}...({} chars)", head, val.len())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  APIFY_TOKEN: {}", preview(&self.apify_token));
        tracing::info!("  TWITTER_HANDLE: {}", self.twitter_handle);
        tracing::info!("  SAND_BATCH_DIR: {}", self.batch_dir.display());
        tracing::info!("  SAND_CORPUS_PATH: {}", self.corpus_path.display());
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, SandError> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SandError::Config(format!("{key} environment variable is required")))
}

fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_string()
}

fn apify_token(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, SandError> {
    let token = required(lookup, "APIFY_TOKEN")?;
    if token == PLACEHOLDER_TOKEN {
        return Err(SandError::Config(
            "APIFY_TOKEN still holds the placeholder value; set a real token in .env".to_string(),
        ));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn merge_config_uses_defaults() {
        let config = Config::base_from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.batch_dir, PathBuf::from("data/raw/batches"));
        assert_eq!(config.corpus_path, PathBuf::from("data/raw/complete.json"));
        assert_eq!(config.batch_delay, Duration::from_secs(5));
        assert_eq!(config.web_port, 3847);
        assert!(config.apify_token.is_empty());
    }

    #[test]
    fn collector_config_requires_token_and_handle() {
        let missing_token =
            Config::collector_from_lookup(lookup(&[("TWITTER_HANDLE", "sand")]), None);
        assert!(matches!(missing_token, Err(SandError::Config(_))));

        let missing_handle = Config::collector_from_lookup(lookup(&[("APIFY_TOKEN", "tok")]), None);
        assert!(matches!(missing_handle, Err(SandError::Config(_))));

        let blank_flag =
            Config::collector_from_lookup(lookup(&[("APIFY_TOKEN", "tok")]), Some("  @ "));
        assert!(matches!(blank_flag, Err(SandError::Config(_))));

        let config = Config::collector_from_lookup(
            lookup(&[("APIFY_TOKEN", "tok"), ("TWITTER_HANDLE", "@sand")]),
            None,
        )
        .unwrap();
        assert_eq!(config.twitter_handle, "sand");
        assert_eq!(config.apify_token, "tok");
    }

    #[test]
    fn handle_flag_alone_is_enough() {
        let config =
            Config::collector_from_lookup(lookup(&[("APIFY_TOKEN", "tok")]), Some("@foo")).unwrap();
        assert_eq!(config.twitter_handle, "foo");
    }

    #[test]
    fn handle_flag_overrides_env() {
        let config = Config::collector_from_lookup(
            lookup(&[("APIFY_TOKEN", "tok"), ("TWITTER_HANDLE", "sand")]),
            Some("foo"),
        )
        .unwrap();
        assert_eq!(config.twitter_handle, "foo");
    }

    #[test]
    fn placeholder_token_is_rejected() {
        let result = Config::web_from_lookup(lookup(&[("APIFY_TOKEN", PLACEHOLDER_TOKEN)]));
        assert!(matches!(result, Err(SandError::Config(_))));
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        let result = Config::base_from_lookup(lookup(&[("WEB_PORT", "http")]));
        assert!(matches!(result, Err(SandError::Config(_))));

        let result = Config::base_from_lookup(lookup(&[("SAND_BATCH_DELAY_SECS", "-1")]));
        assert!(matches!(result, Err(SandError::Config(_))));
    }

    #[test]
    fn overrides_are_honored() {
        let config = Config::base_from_lookup(lookup(&[
            ("SAND_BATCH_DIR", "/tmp/batches"),
            ("SAND_CORPUS_PATH", "/tmp/out.json"),
            ("SAND_BATCH_DELAY_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.batch_dir, PathBuf::from("/tmp/batches"));
        assert_eq!(config.corpus_path, PathBuf::from("/tmp/out.json"));
        assert_eq!(config.batch_delay, Duration::ZERO);
    }
}
