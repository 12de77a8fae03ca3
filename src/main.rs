//! Tiered File Cache admin CLI
//!
//! Inspect and maintain a cache directory from the command line: store and
//! read files, list entries per tier, print statistics, run the age sweep
//! and clear tiers.
//!
//! Logs go to stderr so `get` can stream file bytes to stdout.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tiered_file_cache::{CacheConfig, CacheTier, Error, Result, StoreOptions, TieredFileCache};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tiered File Cache - bounded hot/warm/cold file cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache root directory (tier directories and index live here)
    #[arg(long, env = "CACHE_ROOT", default_value = ".tiered-file-cache")]
    root: PathBuf,

    /// YAML cache configuration file
    #[arg(long, env = "CACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a local file in the cache under a logical path
    Put {
        /// Logical cache path
        path: String,
        /// File to read the bytes from
        source: PathBuf,
        /// Force a tier instead of classifying by size and priority
        #[arg(long)]
        tier: Option<CacheTier>,
        /// Placement priority (3 = hot, 2 = warm)
        #[arg(long)]
        priority: Option<i32>,
        /// MIME type recorded with the entry
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Read a cached file (counts as an access)
    Get {
        /// Logical cache path
        path: String,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete a cached file
    Rm {
        /// Logical cache path
        path: String,
    },

    /// List entries as JSON
    Ls {
        /// Only list entries in this tier
        #[arg(long)]
        tier: Option<CacheTier>,
    },

    /// Print usage statistics as JSON
    Stats,

    /// Demote or delete entries idle past their tier's max age
    Sweep,

    /// Delete entries from one tier, or from every tier
    Clear {
        #[arg(long)]
        tier: Option<CacheTier>,
    },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = match &args.config {
        Some(path) => CacheConfig::from_yaml_file(path)?,
        None => CacheConfig::default(),
    };
    config.validate()?;

    info!(
        version = tiered_file_cache::VERSION,
        root = %args.root.display(),
        quota = config.quota_bytes,
        "Opening tiered file cache"
    );

    let cache = TieredFileCache::local(&args.root, config);
    if !cache.is_supported() {
        return Err(Error::Unsupported(format!(
            "cannot use {} as a cache root",
            args.root.display()
        )));
    }
    if !cache.init().await {
        return Err(Error::Internal("cache initialization failed".into()));
    }

    let result = run(&cache, args.command).await;
    cache.close().await;
    result
}

async fn run(cache: &TieredFileCache, command: Command) -> Result<()> {
    match command {
        Command::Put {
            path,
            source,
            tier,
            priority,
            content_type,
        } => {
            let data = tokio::fs::read(&source).await?;
            let mut options = StoreOptions::new();
            options.tier = tier;
            options.priority = priority;
            options.content_type = content_type;

            let entry = cache
                .store_file(&path, data, options)
                .await
                .ok_or_else(|| Error::Internal(format!("failed to store {}", path)))?;
            print_json(&entry)
        }

        Command::Get { path, output } => {
            let bytes = cache
                .get_file(&path)
                .await
                .ok_or_else(|| Error::EntryNotFound { path: path.clone() })?;
            match output {
                Some(file) => tokio::fs::write(file, &bytes).await?,
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&bytes).await?;
                    stdout.flush().await?;
                }
            }
            Ok(())
        }

        Command::Rm { path } => {
            if cache.delete_file(&path).await {
                Ok(())
            } else {
                Err(Error::EntryNotFound { path })
            }
        }

        Command::Ls { tier } => print_json(&cache.list_files(tier).await),

        Command::Stats => print_json(&cache.get_stats().await),

        Command::Sweep => print_json(&cache.sweep_expired().await),

        Command::Clear { tier } => {
            let cleared = match tier {
                Some(tier) => cache.clear_tier(tier).await,
                None => cache.clear_all().await,
            };
            if cleared {
                Ok(())
            } else {
                Err(Error::Internal("failed to clear cache".into()))
            }
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
