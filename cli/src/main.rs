//! Transfer Sequencer CLI
//!
//! # Commands
//! - `transfer-seq plan <file>` - Dry-run a transfer file step by step
//! - `transfer-seq check <file>` - Parse a transfer file and print batch statistics
//!
//! Log output goes to stderr and is controlled with `RUST_LOG`.

mod check;
mod plan;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use transfer_sequencer_core_rs::{ParseMode, RackOrigin, SequencerConfig};

/// Transfer Sequencer CLI
#[derive(Parser)]
#[command(name = "transfer-seq")]
#[command(
    author,
    version,
    about = "Dry-run and validate liquid-handling transfer files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk every step and print the tip and plate decisions
    Plan {
        /// Transfer file
        file: String,

        /// Parser mode (transfer, adapter:truseq, adapter:sureselect, dilution, lims_dilution)
        #[arg(short, long)]
        mode: Option<String>,

        /// Tip rack origin as ROW,COLUMN (a rack corner)
        #[arg(long, value_parser = parse_origin)]
        origin: Option<RackOrigin>,

        /// JSON run configuration
        #[arg(short, long)]
        config: Option<String>,

        /// Append committed steps to this CSV journal
        #[arg(short, long)]
        journal: Option<String>,
    },

    /// Parse a transfer file and print batch statistics
    Check {
        /// Transfer file
        file: String,

        /// Parser mode
        #[arg(short, long, default_value = "transfer")]
        mode: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            file,
            mode,
            origin,
            config,
            journal,
        } => {
            let config = build_config(config.as_deref(), mode.as_deref(), origin)?;
            plan::run_plan_command(&file, config, journal.as_deref())
        }
        Commands::Check { file, mode } => {
            let mode: ParseMode = mode.parse()?;
            check::run_check_command(&file, mode)
        }
    }
}

/// Merge the JSON configuration file with command-line overrides
fn build_config(
    path: Option<&str>,
    mode: Option<&str>,
    origin: Option<RackOrigin>,
) -> Result<SequencerConfig> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => SequencerConfig::default(),
    };

    if let Some(mode) = mode {
        config.mode = mode.parse()?;
    }
    if let Some(origin) = origin {
        config.tip_origin = origin;
    }
    Ok(config)
}

fn parse_origin(value: &str) -> Result<RackOrigin, String> {
    let (row, column) = value
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COLUMN, got '{}'", value))?;
    let row = row.trim().parse().map_err(|_| format!("invalid row '{}'", row))?;
    let column = column
        .trim()
        .parse()
        .map_err(|_| format!("invalid column '{}'", column))?;
    Ok(RackOrigin { row, column })
}
