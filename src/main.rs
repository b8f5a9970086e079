//! Siterip main entry point
//!
//! Command-line interface for the Siterip crawler and file downloader.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use siterip::config::{validate, Config, CrawlLimits, UploadConfig};
use siterip::crawler::crawl;
use siterip::ConfigError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Siterip: a depth-bounded site crawler and file downloader
///
/// Crawls a web site from a starting URL, downloads files whose
/// extensions match, and follows links on HTML pages up to the
/// configured depth. Downloads can optionally be mirrored to a remote
/// object-storage container.
#[derive(Parser, Debug)]
#[command(name = "siterip")]
#[command(version)]
#[command(about = "Crawl a web site and download matching files", long_about = None)]
struct Cli {
    /// The URL crawling starts from
    #[arg(value_name = "STARTING_URL")]
    starting_url: String,

    /// Directory downloaded files are written to
    #[arg(value_name = "DOWNLOAD_DIR")]
    download_dir: PathBuf,

    /// Maximum link-hop depth; the starting URL is depth 1 (0 = unbounded)
    #[arg(long, default_value_t = 2)]
    max_depth: u32,

    /// Render pages in a headless browser session (WebDriver) so
    /// script-built navigation is visible
    #[arg(long)]
    js: bool,

    /// Restrict crawling to the starting URL's host
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    stay_on_domain: bool,

    /// Maximum number of files to download (0 = unbounded)
    #[arg(long, default_value_t = 100)]
    max_files: usize,

    /// File extensions to download, without the dot
    #[arg(long, num_args = 1.., default_values_t = [String::from("pdf"), String::from("html")])]
    extensions: Vec<String>,

    /// Seconds to wait between requests
    #[arg(long, default_value_t = 1.0)]
    delay: f64,

    /// URL substrings excluded from downloading
    #[arg(long, num_args = 1..)]
    exclude_download: Vec<String>,

    /// URL substrings excluded from crawling
    #[arg(long, num_args = 1..)]
    exclude_crawl: Vec<String>,

    /// Mirror downloaded files to remote object storage
    #[arg(long)]
    upload_blob: bool,

    /// Remote container name (required with --upload-blob)
    #[arg(long)]
    container: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let summary = match crawl(config).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    println!(
        "Finished crawling. Total files downloaded: {}",
        summary.downloaded
    );
    Ok(())
}

/// Builds and validates the crawl configuration from CLI arguments
fn build_config(cli: Cli) -> Result<Config, ConfigError> {
    let start_url = Url::parse(&cli.starting_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", cli.starting_url, e)))?;

    if !cli.delay.is_finite() || cli.delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay must be a non-negative number of seconds, got {}",
            cli.delay
        )));
    }

    let upload = if cli.upload_blob {
        let container = cli.container.ok_or_else(|| {
            ConfigError::Validation(
                "specify --container <NAME> when --upload-blob is set".to_string(),
            )
        })?;
        Some(UploadConfig { container })
    } else {
        None
    };

    let config = Config {
        start_url,
        download_dir: cli.download_dir,
        limits: CrawlLimits {
            max_depth: cli.max_depth,
            max_files: cli.max_files,
            stay_on_domain: cli.stay_on_domain,
            extensions: cli.extensions.iter().map(|e| e.to_lowercase()).collect(),
            delay: Duration::from_secs_f64(cli.delay),
            exclude_download: cli.exclude_download,
            exclude_crawl: cli.exclude_crawl,
        },
        js: cli.js,
        upload,
    };

    validate(&config)?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("siterip=info,warn"),
            1 => EnvFilter::new("siterip=debug,info"),
            2 => EnvFilter::new("siterip=trace,debug"),
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
