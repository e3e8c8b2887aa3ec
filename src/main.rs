//! VDP-Scout main entry point
//!
//! This is the command-line interface for the VDP-Scout pricing service.

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vdp_scout::config::{load_config_with_hash, Config};
use vdp_scout::server::{serve, AppState};
use vdp_scout::JobRegistry;

/// VDP-Scout: competitive pricing from dealer sitemaps
///
/// VDP-Scout serves an HTTP API that accepts competitor sitemap URLs,
/// analyzes their vehicle detail pages in background jobs and offers the
/// results as a CSV download.
#[derive(Parser, Debug)]
#[command(name = "vdp-scout")]
#[command(version)]
#[command(about = "Competitive vehicle pricing scraper", long_about = None)]
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

    /// Validate config and print the resolved settings without serving
    #[arg(long)]
    dry_run: bool,

    /// Override the configured listen address
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen.to_string();
    }

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    run_server(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vdp_scout=info,warn"),
            1 => EnvFilter::new("vdp_scout=debug,tower_http=debug,info"),
            2 => EnvFilter::new("vdp_scout=trace,debug"),
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

/// Handles the --dry-run mode: prints the resolved configuration
fn print_dry_run(config: &Config) {
    println!("=== VDP-Scout Dry Run ===\n");

    println!("Scraper:");
    println!("  VDP limit per sitemap: {}", config.scraper.vdp_limit);
    println!("  Delay between pages: {}ms", config.scraper.page_delay_ms);
    println!("  Request timeout: {}s", config.scraper.request_timeout_secs);
    println!(
        "  Retries: {} (base delay {}ms)",
        config.scraper.max_retries, config.scraper.retry_base_delay_ms
    );

    println!("\nExtractor:");
    println!("  Model: {}", config.extractor.model);
    println!("  Endpoint: {}", config.extractor.base_url);
    println!("  Default make: {}", config.extractor.default_make);
    println!("  Request timeout: {}s", config.extractor.request_timeout_secs);

    println!("\nServer:");
    println!("  Listen address: {}", config.server.listen_addr);
    println!("  CORS: {}", if config.server.cors_enabled { "enabled" } else { "disabled" });

    println!("\nOutput:");
    println!("  Export directory: {}", config.output.export_dir);
    match config.registry.job_retention_secs {
        Some(secs) => println!("  Finished jobs kept for: {}s", secs),
        None => println!("  Finished jobs kept for: process lifetime"),
    }

    println!("\nCompetitors ({}):", config.competitor.len());
    for entry in &config.competitor {
        println!("  - {} => {}", entry.pattern, entry.name);
    }

    println!("\n✓ Configuration is valid");
}

/// Wires the collaborators together and serves until Ctrl-C
async fn run_server(config: Config) -> anyhow::Result<()> {
    let registry = JobRegistry::from_config(&config).context("Failed to set up job runner")?;
    let registry = Arc::new(registry);

    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .context("Invalid listen address")?;
    let state = AppState::new(registry, &config);

    serve(addr, state, config.server.cors_enabled, shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl-C, shutting down");
}
