//! Command-line interface for feedsync.
//!
//! `sync` runs the full interactive flow: connectivity probe, discovery,
//! confirmations, network path prompt, registration, summary. `scan` and
//! `probe` expose the read-only stages on their own.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Text};
use tracing::error;

use crate::catalog::{Catalog, MySqlCatalog};
use crate::config::Config;
use crate::discover::{self, FeedCandidate};
use crate::netpath::BasePath;
use crate::register;

/// feedsync - register air-gapped feed folders in a MISP catalog database
#[derive(Parser, Debug)]
#[command(name = "feedsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for new feed folders and register them in the catalog
    Sync {
        /// Base directory to scan (overrides configuration)
        #[arg(long)]
        feeds_dir: Option<PathBuf>,

        /// Base network path under which the feed folders are served
        /// (prompted for interactively if not given)
        #[arg(long)]
        url: Option<String>,

        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,
    },

    /// Probe the catalog and list new feed folders without writing anything
    Scan {
        /// Base directory to scan (overrides configuration)
        #[arg(long)]
        feeds_dir: Option<PathBuf>,

        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Test catalog connectivity and exit
    Probe,

    /// Show resolved configuration (password redacted)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Commands::Sync { feeds_dir, url, yes } => sync(config, feeds_dir, url, yes).await,
            Commands::Scan { feeds_dir, json } => scan(config, feeds_dir, json).await,
            Commands::Probe => probe(config).await,
            Commands::Config => show_config(&config),
        }
    }
}

/// Startup banner
fn banner() {
    println!(
        r#"
  __               _
 / _| ___  ___  __| |___ _   _ _ __   ___
| |_ / _ \/ _ \/ _` / __| | | | '_ \ / __|
|  _|  __/  __/ (_| \__ \ |_| | | | | (__
|_|  \___|\___|\__,_|___/\__, |_| |_|\___|
                         |___/
"#
    );
}

/// Run the full interactive synchronization flow
async fn sync(
    config: Config,
    feeds_dir: Option<PathBuf>,
    url: Option<String>,
    yes: bool,
) -> Result<()> {
    banner();

    let catalog = MySqlCatalog::new(&config.catalog);

    // Connectivity gate: nothing else runs if the catalog is unreachable.
    if let Err(e) = catalog.probe().await {
        eprintln!("[ERROR] Catalog connection test failed!\n{}", e);
        std::process::exit(1);
    }
    println!("[SUCCESS] Catalog connection test successful!");

    if !yes && !confirm("Continue with feed import to the catalog database?")? {
        return Ok(());
    }

    let feeds_dir = feeds_dir.unwrap_or_else(|| config.feeds_dir.clone());
    let candidates = match discover::scan(&feeds_dir, &catalog, config.default_format).await {
        Ok(candidates) => candidates,
        Err(e) => {
            error!("scan aborted: {:#}", e);
            Vec::new()
        }
    };

    if candidates.is_empty() {
        println!("No new feed folders found. Exiting.");
        return Ok(());
    }

    println!("\n--- New feed folders found: ---");
    for candidate in &candidates {
        println!("- {} (format: {})", candidate.name, candidate.format);
    }

    if !yes && !confirm("Add all these new feeds to the catalog database?")? {
        println!("User cancelled. Exiting.");
        return Ok(());
    }

    let base = match read_base_path(url)? {
        Some(base) => base,
        None => {
            // Invalid input aborts before any registration.
            std::process::exit(1);
        }
    };

    println!("\n--- Adding feeds to the catalog database... ---");
    let report = register::register_all(&catalog, &base, &candidates).await;

    println!("\n--- Feed catalog integration completed. ---");
    println!(
        "{} registered, {} already present, {} skipped, {} errors",
        report.registered, report.already_present, report.skipped_no_data, report.errors
    );

    Ok(())
}

/// Dry run: probe, discover, print, write nothing
async fn scan(config: Config, feeds_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let catalog = MySqlCatalog::new(&config.catalog);

    if let Err(e) = catalog.probe().await {
        eprintln!("[ERROR] Catalog connection test failed!\n{}", e);
        std::process::exit(1);
    }

    let feeds_dir = feeds_dir.unwrap_or_else(|| config.feeds_dir.clone());
    let candidates = discover::scan(&feeds_dir, &catalog, config.default_format).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    } else if candidates.is_empty() {
        println!("No new feed folders found.");
    } else {
        for candidate in &candidates {
            print_candidate(candidate);
        }
    }

    Ok(())
}

fn print_candidate(candidate: &FeedCandidate) {
    println!(
        "- {} (format: {}, {} data file{})",
        candidate.name,
        candidate.format,
        candidate.data_files.len(),
        if candidate.data_files.len() == 1 { "" } else { "s" }
    );
}

/// Connectivity check; exit status reflects the result
async fn probe(config: Config) -> Result<()> {
    let catalog = MySqlCatalog::new(&config.catalog);

    match catalog.probe().await {
        Ok(()) => {
            println!("[SUCCESS] Catalog connection test successful!");
            Ok(())
        }
        Err(e) => {
            eprintln!("[ERROR] Catalog connection test failed!\n{}", e);
            std::process::exit(1);
        }
    }
}

/// Show resolved configuration with the password redacted
fn show_config(config: &Config) -> Result<()> {
    println!("Catalog:");
    println!("  host: {}", config.catalog.host);
    println!("  port: {}", config.catalog.port);
    println!("  user: {}", config.catalog.user);
    println!(
        "  password: {}",
        if config.catalog.password.is_empty() { "(empty)" } else { "********" }
    );
    println!("  database: {}", config.catalog.database);
    println!("  connect timeout: {}s", config.catalog.connect_timeout_secs);
    println!("Feeds directory: {}", config.feeds_dir.display());
    println!("Default format: {}", config.default_format);
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none found, using defaults)"),
    }

    Ok(())
}

/// Yes/no prompt, defaulting to no
fn confirm(message: &str) -> Result<bool> {
    Confirm::new(message)
        .with_default(false)
        .prompt()
        .context("failed to read confirmation")
}

/// Obtain and validate the base network path.
///
/// Returns `None` after printing a diagnostic when the input fails the
/// scheme check.
fn read_base_path(url: Option<String>) -> Result<Option<BasePath>> {
    let input = match url {
        Some(url) => url,
        None => Text::new("Enter the base network path (e.g., http://192.168.1.37:8080/):")
            .prompt()
            .context("failed to read network path")?,
    };

    match BasePath::parse(&input) {
        Ok(base) => Ok(Some(base)),
        Err(e) => {
            eprintln!("{}", e);
            Ok(None)
        }
    }
}
