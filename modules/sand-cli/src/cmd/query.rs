use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use apify_client::ApifyClient;
use tracing::info;

use sand_collect::{parse_query_date, parse_query_limit, QueryCollector};
use sand_common::Config;
use sand_corpus::QueryFilter;

pub async fn run(
    handle: String,
    topic: Option<String>,
    from: Option<String>,
    to: Option<String>,
    limit: Option<String>,
    out: Option<PathBuf>,
) -> Result<ExitCode> {
    let config = Config::web_from_env()?;

    let filter = QueryFilter::new(
        topic.as_deref(),
        parse_query_date(from.as_deref())?,
        parse_query_date(to.as_deref())?,
        parse_query_limit(limit.as_deref())?,
    );

    let collector = QueryCollector::new(ApifyClient::new(config.apify_token));
    let result = collector.run(&handle, &filter).await?;
    let json = serde_json::to_string_pretty(&result)?;

    match out {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), tweets = result.tweets.len(), "Query result saved");
        }
        None => println!("{json}"),
    }

    Ok(ExitCode::SUCCESS)
}
