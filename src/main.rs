// src/main.rs

mod commands;

use clap::{Parser, Subcommand};
use log::{debug, error, LevelFilter};
use std::path::PathBuf;
use std::process::ExitCode;
use window_watcher::config::AppConfig;
use window_watcher::errors::{AppError, AppResult};

/// Reports the active window and the virtual desktop it is on.
#[derive(Parser, Debug)]
#[command(name = "window_watcher", version, about)]
struct Cli {
    /// Path to a JSON config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// macOS automation strategy: jxa or applescript
    #[arg(long, global = true)]
    strategy: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the active window record as a timestamped JSON event (default)
    Current {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print only the current virtual desktop
    Desktop,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, takes precedence over -v.
    env_logger::Builder::new().filter_level(level).parse_default_env().init();
}

fn run() -> AppResult<()> {
    let cli = Cli::try_parse()?;
    init_logging(cli.verbose);

    let mut app_config = AppConfig::load(cli.config.as_deref())?;
    if let Some(strategy) = cli.strategy {
        app_config.mac_strategy = strategy;
    }
    debug!("Effective config: {:?}", app_config);

    match cli.command.unwrap_or(Command::Current { pretty: false }) {
        Command::Current { pretty } => commands::current::execute(&app_config, pretty),
        Command::Desktop => commands::desktop::execute(&app_config),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        // Help and version requests also arrive here; clap knows how to exit for them.
        Err(AppError::CliArgs(e)) => e.exit(),
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
