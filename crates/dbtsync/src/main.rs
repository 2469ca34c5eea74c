//! dbtsync
//!
//! Keeps dbt source YAML files in step with live warehouse tables:
//! - **update**: merge a table's description, labels and columns into a source file
//! - **check**: confirm a file is a single-dataset, single-table source
//! - **config**: show resolved paths and settings

use anyhow::Result;
use clap::{Parser, Subcommand};
use dbtsync_logging::{init_logging, LogConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod cli;

use cli::config::{default_config_path, ensure_logs_dir, load_config, FileConfig};

#[derive(Parser, Debug)]
#[command(name = "dbtsync", version, about = "Sync dbt source YAML with warehouse table schemas")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.dbtsync/config.toml)
    #[arg(long, global = true, env = "DBTSYNC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Update a source file from warehouse table metadata
    ///
    /// Examples:
    ///   bq show --format=prettyjson acme:raw.orders > orders.json
    ///   dbtsync update models/src_orders.yml --table orders.json
    ///   dbtsync update models/src_orders.yml -t orders.json --dry-run
    Update(cli::update::UpdateArgs),

    /// Validate a source file without changing it
    Check(cli::check::CheckArgs),

    /// Show configuration paths and settings
    Config(cli::config::ConfigArgs),
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Update(args) => args.json,
        Commands::Check(args) => args.json,
        Commands::Config(args) => args.json,
    }
}

fn run_command(command: Commands, config_path: &Path, config: &FileConfig) -> Result<()> {
    match command {
        Commands::Update(args) => cli::update::run(args),
        Commands::Check(args) => cli::check::run(args),
        Commands::Config(args) => cli::config::run(args, config_path, config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Warning: {:#}; using defaults", err);
            FileConfig::default()
        }
    };

    let log_dir = match ensure_logs_dir() {
        Ok(dir) => Some(dir),
        Err(err) => {
            eprintln!("Warning: {:#}", err);
            None
        }
    };
    if let Err(err) = init_logging(LogConfig {
        app_name: "dbtsync",
        verbose: cli.verbose,
        filter: config.log_filter.as_deref(),
        log_dir,
    }) {
        eprintln!("Warning: {:#}", err);
    }

    match run_command(cli.command, &config_path, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{:#}", err);
            tracing::info!(error = %message, "Command failed");
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
