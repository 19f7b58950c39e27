//! `sand`: collect a Twitter/X account's history in batches and merge it
//! into one deduplicated corpus.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sand_corpus::IdOrdering;

mod cmd;

#[derive(Parser)]
#[command(name = "sand")]
#[command(about = "Tweet collection and corpus merging")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every batch file into one deduplicated corpus
    Merge {
        /// Directory holding batch_*.json files
        #[arg(long, env = "SAND_BATCH_DIR")]
        batch_dir: Option<PathBuf>,

        /// Corpus file to write (overwritten)
        #[arg(short, long, env = "SAND_CORPUS_PATH")]
        output: Option<PathBuf>,

        /// Id ordering for the newest-first sort
        #[arg(long, default_value_t = IdOrdering::Lexicographic)]
        ordering: IdOrdering,
    },

    /// Collect an account's history one quarter at a time
    Collect {
        /// Account to collect (defaults to TWITTER_HANDLE)
        #[arg(long)]
        handle: Option<String>,

        /// First day to collect, YYYY-MM-DD (defaults to SAND_COLLECT_SINCE)
        #[arg(long)]
        since: Option<String>,

        /// Last day to collect, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        until: Option<String>,

        #[arg(long)]
        batch_dir: Option<PathBuf>,
    },

    /// Fetch recent tweets of one account, filtered by topic and dates
    Query {
        #[arg(long)]
        handle: String,

        /// Case-insensitive substring to match in tweet text
        #[arg(long)]
        topic: Option<String>,

        /// YYYY-MM-DD, inclusive
        #[arg(long)]
        from: Option<String>,

        /// YYYY-MM-DD, inclusive
        #[arg(long)]
        to: Option<String>,

        /// Maximum tweets to return, or "all"
        #[arg(long)]
        limit: Option<String>,

        /// Write the JSON result here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Verify the Apify token by fetching the account
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sand=info".parse()?)
                .add_directive("apify_client=info".parse()?),
        )
        .init();

    match cli.command {
        Commands::Merge {
            batch_dir,
            output,
            ordering,
        } => cmd::merge::run(batch_dir, output, ordering),
        Commands::Collect {
            handle,
            since,
            until,
            batch_dir,
        } => cmd::collect::run(handle, since, until, batch_dir).await,
        Commands::Query {
            handle,
            topic,
            from,
            to,
            limit,
            out,
        } => cmd::query::run(handle, topic, from, to, limit, out).await,
        Commands::Check => cmd::check::run().await,
    }
}
