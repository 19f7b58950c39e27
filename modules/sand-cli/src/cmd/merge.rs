use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;

use sand_common::Config;
use sand_corpus::{BatchMerger, IdOrdering, MergeSummary};

use super::RULE;

pub fn run(batch_dir: Option<PathBuf>, output: Option<PathBuf>, ordering: IdOrdering) -> Result<ExitCode> {
    let config = Config::merge_from_env()?;
    let merger = BatchMerger::new(
        batch_dir.unwrap_or(config.batch_dir),
        output.unwrap_or(config.corpus_path),
    )
    .with_ordering(ordering);

    println!("Reading batches from: {}", merger.batch_dir().display());

    match merger.run() {
        Ok(summary) => {
            print_summary(&summary);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(remedy) = e.remedy() {
                eprintln!("   {remedy}");
            }
            Ok(ExitCode::from(1))
        }
    }
}

fn print_summary(summary: &MergeSummary) {
    let meta = &summary.metadata;

    println!("\n{RULE}");
    println!("MERGE STATISTICS");
    println!("{RULE}");

    println!("\nBatches processed:");
    for stat in &summary.batches {
        println!("   {}:", stat.file);
        println!("      Date range: {}", stat.date_range);
        println!(
            "      Tweets: {} ({} unique, {} duplicates)",
            stat.total, stat.unique, stat.duplicates
        );
    }
    for skipped in &summary.skipped {
        println!("   {}: skipped ({})", skipped.file, skipped.reason);
    }

    let breakdown = &meta.content_breakdown;
    let whole = breakdown.total();
    println!("\n{RULE}");
    println!("MERGE COMPLETE");
    println!("{RULE}");
    println!("Total unique tweets: {}", meta.unique_tweets);
    println!("Duplicates removed: {}", meta.duplicates_removed);
    println!("Batches merged: {}", meta.batches_merged);
    if summary.synthesized_ids > 0 {
        println!(
            "Records without an upstream id: {} (these will not dedup on the next run)",
            summary.synthesized_ids
        );
    }
    println!("\nContent breakdown:");
    println!(
        "   Original tweets: {} ({}%)",
        breakdown.original_tweets,
        percent(breakdown.original_tweets, whole)
    );
    println!(
        "   Retweets: {} ({}%)",
        breakdown.retweets,
        percent(breakdown.retweets, whole)
    );
    println!(
        "   Thread replies: {} ({}%)",
        breakdown.thread_replies,
        percent(breakdown.thread_replies, whole)
    );

    println!("\nCorpus saved to: {}", summary.output_path.display());
    println!(
        "   File size: {:.2} MB",
        summary.output_bytes as f64 / 1024.0 / 1024.0
    );
    println!("{RULE}");
}

fn percent(part: usize, whole: usize) -> u64 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u64
}
