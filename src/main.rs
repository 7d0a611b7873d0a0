//! Sitemirror main entry point
//!
//! Command-line interface for the bounded recursive site mirrorer.

use clap::Parser;
use sitemirror::crawler::CrawlReport;
use sitemirror::{ContentPolicy, CrawlConfig, Crawler};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Sitemirror: a bounded recursive website mirrorer
///
/// Starting from one URL, sitemirror discovers same-site links and mirrors
/// matched content to a local folder exactly once per logical resource,
/// resuming across restarts.
#[derive(Parser, Debug)]
#[command(name = "sitemirror")]
#[command(version = "1.0.0")]
#[command(about = "Mirror a website section to local storage", long_about = None)]
struct Cli {
    /// Starting URL; its scheme, host, and path prefix define the crawl scope
    #[arg(value_name = "URL")]
    url: String,

    /// Local folder to save mirrored content into
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Attribute name the seed-page container filter matches on
    /// (e.g. class, id, aria-label)
    #[arg(long, value_name = "NAME", requires = "filter_text")]
    filter_attr: Option<String>,

    /// Text searched for in seed-page container attributes; without
    /// --filter-attr every attribute is searched
    #[arg(long, value_name = "TEXT")]
    filter_text: Option<String>,

    /// Download only the starting page instead of following links
    #[arg(long)]
    single_page: bool,

    /// Seconds to pause between requests
    #[arg(long, default_value_t = 0.5, value_name = "SECONDS")]
    delay: f64,

    /// Maximum number of resources to save (0 = unlimited)
    #[arg(long, default_value_t = 0, value_name = "N")]
    max_pages: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    timeout: u64,

    /// Skip targets whose file already exists in the output folder
    #[arg(long)]
    resume: bool,

    /// What to download: pages, attachments, or all
    #[arg(long, value_enum, default_value = "pages")]
    content: ContentPolicy,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = CrawlConfig {
        start_url: cli.url,
        output_root: cli.output,
        filter_attr: cli.filter_attr,
        filter_text: cli.filter_text,
        recursive: !cli.single_page,
        delay: Duration::from_secs_f64(cli.delay.max(0.0)),
        max_pages: cli.max_pages,
        timeout: Duration::from_secs(cli.timeout),
        resume: cli.resume,
        content: cli.content,
        verbose: cli.verbose > 0,
    };

    print_banner(&config);

    let output_root = config.output_root.clone();

    // Building the crawler validates the config and constructs the HTTP
    // client; either failing is fatal before any target is processed
    let mut crawler = match Crawler::new(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Cannot start crawl: {}", e);
            return Err(e.into());
        }
    };

    let report = crawler.run().await?;
    print_summary(&report, &output_root);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemirror=info,warn"),
            1 => EnvFilter::new("sitemirror=debug,info"),
            2 => EnvFilter::new("sitemirror=trace,debug"),
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

/// Prints the run banner
fn print_banner(config: &CrawlConfig) {
    println!("{}", "=".repeat(70));
    println!("  sitemirror - Starting crawl");
    println!("  URL:    {}", config.start_url.trim_end_matches('/'));
    println!("  Output: {}", config.output_root.display());
    if let Some(text) = &config.filter_text {
        let attr = config.filter_attr.as_deref().unwrap_or("(any attribute)");
        println!("  Filter: {} = '{}'", attr, text);
    }
    println!("  Content:   {:?}", config.content);
    println!("  Recursive: {}", config.recursive);
    println!(
        "  Delay: {:.1}s | Timeout: {}s",
        config.delay.as_secs_f64(),
        config.timeout.as_secs()
    );
    if config.max_pages > 0 {
        println!("  Max pages: {}", config.max_pages);
    }
    if config.resume {
        println!("  Resume mode: ON (skipping existing files)");
    }
    println!("{}", "=".repeat(70));
    println!();
}

/// Prints the completion summary and the failure ledger
fn print_summary(report: &CrawlReport, output_root: &std::path::Path) {
    println!();
    println!("{}", "=".repeat(70));
    println!("  Crawl Complete");
    println!("  Pages saved:   {}", report.saved);
    println!("  Pages visited: {}", report.visited);
    println!("  Pages failed:  {}", report.failed.len());
    println!("  Output folder: {}", output_root.display());
    println!("{}", "=".repeat(70));

    if !report.failed.is_empty() {
        println!();
        println!("  Failed URLs:");
        for (url, reason) in &report.failed {
            println!("    [{}] {}", reason, url);
        }
        println!();
    }
}
