use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rerelease::config::Config;
use rerelease::error::Error;

mod commands;

#[derive(Parser)]
#[command(
    name = "rerelease",
    version,
    about = "Replay an archive of feed items on a new recurring schedule",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the occurrences a rule generates from a start instant
    Expand {
        /// Recurrence rule, e.g. 2wTuTh
        #[arg(short, long, default_value = "1w")]
        rule: String,

        /// Anchor instant (defaults to now)
        #[arg(short, long)]
        start: Option<String>,

        /// Number of occurrences to print
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Show how a rule text is interpreted
    Rule {
        /// Rule text to normalize
        text: String,
    },

    /// Compute the schedule for one shareable address
    Schedule {
        /// Query string, e.g. "start=...&rule=2wTuTh&uri=..."
        #[arg(short, long)]
        query: String,

        /// Read items from a JSON file instead of the summary endpoint
        #[arg(short, long)]
        items: Option<PathBuf>,

        /// Print the schedule as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Read one query string per stdin line and follow the published schedule
    Watch {
        /// Read items from a JSON file instead of the summary endpoint
        #[arg(short, long)]
        items: Option<PathBuf>,

        /// Prefix printed before every written address
        #[arg(long, default_value = "address: ?")]
        prefix: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);

    // Initialize tracing/logging
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Expand { rule, start, count } => {
            tracing::debug!(rule = %rule, start = ?start, count, "Starting expand command");
            commands::expand(&rule, start.as_deref(), count)?;
        }

        Commands::Rule { text } => {
            commands::rule(&text);
        }

        Commands::Schedule { query, items, json } => {
            tracing::info!(query = %query, items = ?items, json, "Starting schedule command");
            commands::schedule(&config, &query, items.as_deref(), json).await?;
        }

        Commands::Watch { items, prefix } => {
            tracing::info!(items = ?items, "Starting watch command");
            commands::watch(&config, items.as_deref(), prefix).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config
        .validate()
        .map_err(|e| Error::config(format!("{e:#}")))
        .context("Invalid configuration")?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("rerelease=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new(format!("rerelease={level},warn"))
    };

    // Logs go to stderr so stdout stays usable for addresses and JSON
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
