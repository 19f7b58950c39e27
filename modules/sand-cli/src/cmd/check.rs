use std::process::ExitCode;

use anyhow::{Context, Result};
use apify_client::ApifyClient;

use sand_common::Config;

pub async fn run() -> Result<ExitCode> {
    let config = Config::web_from_env()?;
    config.log_redacted();

    let client = ApifyClient::new(config.apify_token);
    let user = client
        .get_user()
        .await
        .context("Apify connectivity check failed")?;

    println!("Connected to Apify");
    println!("Account: {}", user.username.as_deref().unwrap_or("<unknown>"));
    let plan = user
        .plan
        .as_ref()
        .and_then(|p| p.id.as_deref().or(p.name.as_deref()))
        .unwrap_or("<unknown>");
    println!("Plan: {plan}");

    Ok(ExitCode::SUCCESS)
}
