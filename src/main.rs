//! link-crawler main entry point
//!
//! This is the command-line interface for the link-crawler site auditor.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use link_crawler::config::{load_config_with_hash, validate, CrawlConfig};
use link_crawler::output::{export_graph, print_graph, print_summary};
use link_crawler::{run_crawl, CrawlReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_ABORTED: u8 = 130;

/// link-crawler: a bounded-concurrency link auditor
///
/// Crawls every page reachable under the seed URL, reports links that answer
/// with a non-200 status, and writes the link graph in Graphviz format.
#[derive(Parser, Debug)]
#[command(name = "link-crawler")]
#[command(version)]
#[command(about = "A bounded-concurrency link auditor", long_about = None)]
struct Cli {
    /// Seed URL; only pages under this prefix are fetched
    #[arg(value_name = "URL")]
    url: String,

    /// Max number of simultaneously open connections in total [default: 200]
    #[arg(short = 'c', long)]
    max_con: Option<usize>,

    /// Max number of simultaneously open connections to one host [default: 6]
    #[arg(long)]
    max_host_con: Option<usize>,

    /// Max number of requests in total [default: 20000]
    #[arg(short = 't', long)]
    max_total: Option<usize>,

    /// Max number of pending requests [default: 500]
    #[arg(short = 'r', long)]
    max_requests: Option<usize>,

    /// Max number of links to follow per page [default: 20]
    #[arg(short = 'm', long)]
    max_link_per_page: Option<usize>,

    /// File to write the Graphviz link graph to [default: out.gv]
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Only follow absolute hrefs
    #[arg(long)]
    no_follow_relative: bool,

    /// Count connection failures as broken links
    #[arg(long)]
    count_unreachable: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    setup_logging(cli.verbose, cli.quiet);

    match handle_crawl(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_crawler=warn"),
            1 => EnvFilter::new("link_crawler=info,warn"),
            2 => EnvFilter::new("link_crawler=debug,warn"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers defaults, the optional config file, and explicit flags
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = CrawlConfig::new(cli.url.clone());

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
        let (file, hash) = load_config_with_hash(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
        config.apply_file(&file);
    }

    if let Some(v) = cli.max_con {
        config.max_con = v;
    }
    if let Some(v) = cli.max_host_con {
        config.max_host_con = v;
    }
    if let Some(v) = cli.max_total {
        config.max_total = v;
    }
    if let Some(v) = cli.max_requests {
        config.max_pending = v;
    }
    if let Some(v) = cli.max_link_per_page {
        config.max_link_per_page = v;
    }
    if let Some(path) = &cli.output {
        config.output = path.clone();
    }
    if cli.no_follow_relative {
        config.follow_relative_links = false;
    }
    if cli.count_unreachable {
        config.record_transport_failures = true;
    }

    validate(&config)?;
    Ok(config)
}

/// Cancels `cancel` on the first Ctrl-C and exits immediately on the second
fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        tracing::warn!("Interrupt received, finishing in-flight requests; Ctrl-C again aborts");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Aborted");
            std::process::exit(EXIT_ABORTED.into());
        }
    });
}

/// Process status for a finished crawl: failure when any broken link was found
fn exit_status(report: &CrawlReport) -> u8 {
    if report.has_broken_links() {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

/// Prints the summary and writes the graph file
///
/// # Returns
///
/// * `Ok(u8)` - The process status for the crawl's findings
/// * `Err` - The graph file could not be written
fn publish_report(report: &CrawlReport, output: &Path, verbose: u8) -> anyhow::Result<u8> {
    print_summary(report);
    if verbose > 1 {
        print_graph(&report.graph);
    }

    export_graph(&report.graph, output, report.started_at)
        .with_context(|| format!("Failed to write graphviz output to {}", output.display()))?;
    println!("Wrote GraphViz output to {}", output.display());

    Ok(exit_status(report))
}

/// Handles the main crawl operation
async fn handle_crawl(cli: Cli) -> anyhow::Result<ExitCode> {
    let started = Instant::now();
    let config = build_config(&cli)?;
    let output = config.output.clone();

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    println!("Starting crawler at {} . . .", config.seed);
    let report = run_crawl(config, cancel)
        .await
        .context("crawl failed to start")?;

    let status = publish_report(&report, &output, cli.verbose)?;
    println!("Took {:.3}s", started.elapsed().as_secs_f64());

    Ok(ExitCode::from(status))
}
