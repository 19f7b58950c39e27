use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use apify_client::ApifyClient;
use chrono::Utc;

use sand_collect::{parse_query_date, quarterly_windows, BatchCollector, CollectReport, WindowOutcome};
use sand_common::Config;

use super::RULE;

pub async fn run(
    handle: Option<String>,
    since: Option<String>,
    until: Option<String>,
    batch_dir: Option<PathBuf>,
) -> Result<ExitCode> {
    let config = Config::collector_from_env(handle.as_deref())?;
    config.log_redacted();

    let since = parse_query_date(Some(since.as_deref().unwrap_or(&config.collect_since)))?
        .ok_or_else(|| anyhow::anyhow!("a start date is required"))?;
    let until = parse_query_date(until.as_deref())?.unwrap_or_else(|| Utc::now().date_naive());

    let windows = quarterly_windows(since, until);
    if windows.is_empty() {
        eprintln!("Error: nothing to collect between {since} and {until}");
        return Ok(ExitCode::from(1));
    }

    println!("Target: @{}", config.twitter_handle);
    println!("Batches to process: {}", windows.len());

    let collector = BatchCollector::new(
        ApifyClient::new(config.apify_token),
        config.twitter_handle,
        batch_dir.unwrap_or(config.batch_dir),
    )
    .with_delay(config.batch_delay);

    let report = collector.run(&windows).await?;
    print_report(&report);
    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &CollectReport) {
    println!("\n{RULE}");
    println!("BATCH COLLECTION COMPLETE");
    println!("{RULE}");
    for entry in &report.windows {
        let status = match &entry.outcome {
            WindowOutcome::Existing(n) => format!("{n} tweets (already collected)"),
            WindowOutcome::Collected(n) => format!("{n} tweets"),
            WindowOutcome::Failed(reason) => format!("failed: {reason}"),
        };
        println!("   {} ({}): {status}", entry.window.name, entry.window.file_name);
    }
    println!(
        "Successful batches: {}/{}",
        report.successful(),
        report.windows.len()
    );
    println!("Total tweets collected: {}", report.total_tweets());
    println!("Total time: {} minutes", report.elapsed.as_secs() / 60);
    println!(
        "Estimated cost: ${:.2} (at $0.40/1000 tweets)",
        report.estimated_cost_usd()
    );
    println!("\nBatches saved in: {}", report.batch_dir.display());
    println!("Next step: run `sand merge` to combine all batches");
    println!("{RULE}");
}
