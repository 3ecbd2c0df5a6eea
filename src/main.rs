//! Site Archiver main entry point
//!
//! This is the command-line interface for the site archiver.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use site_archiver::archiver::{print_report, Archiver};
use site_archiver::config::{load_config_with_hash, Config};
use tracing_subscriber::EnvFilter;

/// Site Archiver: point-in-time captures of small websites
///
/// Site Archiver crawls a seed URL for same-host pages and assets, rewrites
/// their references to point at the archive, and stores the result under a
/// per-day partition. The stored archive can be browsed through the built-in
/// HTTP server.
#[derive(Parser, Debug)]
#[command(name = "site-archiver")]
#[command(version = "1.0.0")]
#[command(about = "Point-in-time website archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "archiver.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Archive a site starting from a seed URL
    Archive {
        /// Seed URL to archive
        url: String,
    },

    /// List the archived dates for a domain, newest first
    List {
        /// Archive domain (host without `www.`)
        domain: String,
    },

    /// Show the number of archived domains
    Count,

    /// Serve the archive over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Archive { url } => handle_archive(&config, &url).await?,
        Command::List { domain } => handle_list(&config, &domain)?,
        Command::Count => handle_count(&config)?,
        Command::Serve => site_archiver::server::serve(&config).await?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_archiver=info,warn"),
            1 => EnvFilter::new("site_archiver=debug,info"),
            2 => EnvFilter::new("site_archiver=trace,debug"),
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

/// Handles the archive command: runs one capture and prints its report
async fn handle_archive(config: &Config, url: &str) -> anyhow::Result<()> {
    let archiver = Archiver::from_config(config)?;

    tracing::info!("Archiving {}", url);
    match archiver.archive(url).await {
        Ok(report) => {
            print_report(&report);
            if !report.is_complete() {
                tracing::warn!(
                    "Archive of {} finished with {} failed assets",
                    url,
                    report.failures.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Archive failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the list command
fn handle_list(config: &Config, domain: &str) -> anyhow::Result<()> {
    let archiver = Archiver::from_config(config)?;
    let dates = archiver.list_archives(domain);

    if dates.is_empty() {
        println!("No archives for {}", domain);
        return Ok(());
    }

    println!("Archives for {} ({}):", domain, dates.len());
    for date in dates {
        println!("  {}", date);
    }

    Ok(())
}

/// Handles the count command
fn handle_count(config: &Config) -> anyhow::Result<()> {
    let archiver = Archiver::from_config(config)?;
    println!("Archived domains: {}", archiver.domain_count());
    Ok(())
}
