//! Price-Scout main entry point
//!
//! This is the command-line interface for the Price-Scout pipeline.

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use price_scout::config::{load_config_with_hash, Config};
use price_scout::discovery::{GeminiClient, ImageInput};
use price_scout::output::{render, write_report, OutputFormat};
use price_scout::{ExtractionClient, LinkPreparer, ProductScout, ScoutReport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Price-Scout: find where a product is sold and for how much
///
/// Identifies a product from photos or a text query, discovers shopping
/// links, filters them down to product pages, and extracts the listed
/// prices.
#[derive(Parser, Debug)]
#[command(name = "price-scout")]
#[command(version)]
#[command(about = "Product price discovery from photos or search text", long_about = None)]
#[command(group(ArgGroup::new("input").args(["image", "query", "link"]).multiple(false)))]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Product photo(s) to identify
    #[arg(long, value_name = "PATH", num_args = 1..)]
    image: Vec<PathBuf>,

    /// Describe the product in text instead of photos
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,

    /// Price these candidate links directly, skipping discovery
    #[arg(long, value_name = "URL", num_args = 1..)]
    link: Vec<String>,

    /// Resolve and filter links but do not extract prices
    #[arg(long)]
    prepare_only: bool,

    /// Report format: json or text
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show the effective settings without running
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

enum Input {
    Images(Vec<PathBuf>),
    Query(String),
    Links(Vec<String>),
}

impl Cli {
    fn input(&self) -> Option<Input> {
        if !self.image.is_empty() {
            Some(Input::Images(self.image.clone()))
        } else if let Some(query) = &self.query {
            Some(Input::Query(query.clone()))
        } else if !self.link.is_empty() {
            Some(Input::Links(self.link.clone()))
        } else {
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; keys may come from the real environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    let input = match cli.input() {
        Some(input) => input,
        None => bail!("No input given: pass one of --image, --query, or --link"),
    };

    let report = run(&config, input, cli.prepare_only).await?;

    match &cli.output {
        Some(path) => {
            write_report(&report, cli.format, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", render(&report, cli.format)?),
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("price_scout=info,warn"),
            1 => EnvFilter::new("price_scout=debug,info"),
            2 => EnvFilter::new("price_scout=trace,debug"),
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

/// Assembles only the collaborators the input needs, then runs it
async fn run(config: &Config, input: Input, prepare_only: bool) -> anyhow::Result<ScoutReport> {
    let mut scout = ProductScout::new(LinkPreparer::from_config(config)?);

    if !prepare_only {
        scout = scout.with_extractor(ExtractionClient::from_config(config)?);
    }

    if !matches!(input, Input::Links(_)) {
        let gemini = Arc::new(GeminiClient::from_config(config)?);
        scout = scout.with_identifier(gemini.clone()).with_discoverer(gemini);
    }

    let report = match input {
        Input::Images(paths) => {
            let images = paths
                .iter()
                .map(|path| ImageInput::from_path(path))
                .collect::<Result<Vec<_>, _>>()?;
            scout.analyze_images(&images).await?
        }
        Input::Query(text) => scout.search(&text).await?,
        Input::Links(links) => scout.price_links(&links).await?,
    };

    tracing::info!(
        request_id = %report.request_id,
        product_links = report.product_links.len(),
        "Request finished"
    );

    Ok(report)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, config_hash: &str) {
    println!("=== Price-Scout Dry Run ===\n");

    println!("User Agent: {}", config.user_agent.header_value());
    println!("Config Hash: {}", config_hash);

    println!("\nLink Preparation:");
    println!("  Max links per request: {}", config.pipeline.max_links);
    println!("  Max redirect hops: {}", config.pipeline.max_redirect_hops);
    println!("  Resolve timeout: {}s", config.pipeline.resolve_timeout_secs);
    println!(
        "  Blocked domains ({}):",
        config.pipeline.blocked_domains.len()
    );
    for domain in &config.pipeline.blocked_domains {
        println!("    - {}", domain);
    }

    println!("\nExtraction:");
    println!("  Endpoint: {}", config.extraction.api_url);
    println!(
        "  API key: ${} ({})",
        config.extraction.api_key_env,
        key_state(&config.extraction.api_key_env)
    );
    println!("  Max concurrent jobs: {}", config.extraction.max_concurrent_jobs);
    println!(
        "  Polling: first after {}ms, then every {}ms, at most {} times",
        config.extraction.initial_poll_delay_ms,
        config.extraction.poll_interval_ms,
        config.extraction.max_poll_attempts
    );

    println!("\nIdentification:");
    println!("  Endpoint: {}", config.identification.api_url);
    println!("  Model: {}", config.identification.model);
    println!(
        "  API key: ${} ({})",
        config.identification.api_key_env,
        key_state(&config.identification.api_key_env)
    );

    println!("\nExtra Classifier Rules ({}):", config.classifier_rules.len());
    for rule in &config.classifier_rules {
        println!(
            "  - {} -> {} ({})",
            rule.pattern,
            rule.verdict,
            rule.domain.as_deref().unwrap_or("all domains")
        );
    }

    println!("\n✓ Configuration is valid");
}

fn key_state(var: &str) -> &'static str {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => "set",
        _ => "not set",
    }
}
