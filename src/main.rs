//! Chunk-Crawler main entry point
//!
//! This is the command-line interface for the Chunk-Crawler crawler.

use anyhow::Context;
use chunk_crawler::config::{load_config_with_hash, Config};
use chunk_crawler::crawler::crawl;
use chunk_crawler::output::{print_report, write_results};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Chunk-Crawler: crawl a bounded site and feed its text to an embedding index
///
/// Chunk-Crawler fetches every in-scope page up to a depth limit, extracts
/// the visible text, cuts it into overlapping chunks and posts each chunk to
/// an indexing service. All chunks of a run are also written to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "chunk-crawler")]
#[command(version)]
#[command(about = "Crawl a site into overlapping text chunks", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Do not deliver chunks to the configured sink; only write the result file
    #[arg(long)]
    no_deliver: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, !cli.no_deliver);
        return Ok(ExitCode::SUCCESS);
    }

    handle_crawl(config, !cli.no_deliver).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("chunk_crawler=info,warn"),
            1 => EnvFilter::new("chunk_crawler=debug,info"),
            2 => EnvFilter::new("chunk_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated config and what would be crawled
fn handle_dry_run(config: &Config, deliver: bool) {
    println!("=== Chunk-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent pages per rate scope: {}",
        config.crawler.max_concurrent_pages_open
    );
    println!(
        "  Minimum time between requests: {}ms",
        config.crawler.minimum_time_on_page
    );
    println!("  Request timeout: {}ms", config.crawler.request_timeout);
    match config.crawler.max_run_duration() {
        Some(limit) => println!("  Run deadline: {}s", limit.as_secs()),
        None => println!("  Run deadline: none"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nScope:");
    for domain in &config.scope.domains {
        println!("  - host {}", domain);
    }
    for pattern in &config.scope.patterns {
        println!("  - pattern {}", pattern);
    }

    println!("\nChunking:");
    println!("  Max chunk length: {}", config.chunking.max_chunk_length);
    println!("  Overlap: {}", config.chunking.overlap_length);

    if let Some(classifier) = &config.classifier {
        println!(
            "\nClassifier: {} of {:?}",
            classifier.min_matches, classifier.keywords
        );
    }

    println!("\nOutput: {}/{}_<timestamp>.json", config.output.directory, config.output.file_prefix);

    match (&config.sink, deliver) {
        (Some(sink), true) => println!(
            "Sink: {} (collection {})",
            sink.endpoint, sink.collection_name
        ),
        _ => println!("Sink: disabled"),
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs:",
        config.scope.seeds.len()
    );
    for seed in &config.scope.seeds {
        println!("    * {}", seed);
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, deliver: bool) -> anyhow::Result<ExitCode> {
    let cancel = CancellationToken::new();
    spawn_cancel_triggers(cancel.clone(), config.crawler.max_run_duration());

    let outcome = crawl(&config, deliver, cancel.clone())
        .await
        .context("Crawl failed")?;
    cancel.cancel();

    // A failed write is reported but does not undo deliveries already made
    let result_file = match write_results(
        Path::new(&config.output.directory),
        &config.output.file_prefix,
        &outcome.chunks,
    ) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!("Could not persist results: {}", e);
            None
        }
    };

    print_report(&outcome.report, result_file.as_deref());

    if outcome.report.partial || outcome.report.has_failures() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Cancels the run on Ctrl-C or when the optional deadline passes
fn spawn_cancel_triggers(cancel: CancellationToken, deadline: Option<std::time::Duration>) {
    tokio::spawn(async move {
        let deadline = async {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };

        let interrupted = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = interrupted => tracing::warn!("Interrupt received, cancelling crawl"),
            _ = deadline => tracing::warn!("Run deadline reached, cancelling crawl"),
        }

        cancel.cancel();
    });
}
