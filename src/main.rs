//! kindling - developer machine bootstrapper
//!
//! Takes a bare macOS or Linux machine to a configured development environment
//! through an ordered chain of idempotent stages (Nix, direnv, tend, the
//! kindling daemon), and compiles the daemon's supervisor configuration for
//! launchd or systemd.

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;
mod commands;
mod config;
mod consent;
mod error;
mod files;
mod paths;
mod platform;
mod progress;
mod resolver;
mod runner;
mod service;
mod shell;
mod stages;
mod tools;
mod ui;

use cli::{Cli, Commands};

/// Environment variable holding the log filter for CLI commands
const LOG_ENV: &str = "KINDLING_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose {
        "kindling=debug"
    } else {
        "kindling=warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();

    // The daemon installs its own JSON subscriber at the configured level.
    if !matches!(cli.command, Commands::Daemon(_)) {
        init_logging(cli.verbose);
    }

    let result = match cli.command {
        Commands::Bootstrap(args) => commands::bootstrap::run(args),
        Commands::Install(args) => commands::install::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Ensure(args) => commands::ensure::run(args),
        Commands::Uninstall => commands::uninstall::run(),
        Commands::Daemon(args) => commands::daemon::run(args),
        Commands::Service(command) => commands::service::run(command),
        Commands::Hook => commands::hook::run(),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(help) = miette::Diagnostic::help(&e) {
            eprintln!("Hint: {help}");
        }
        std::process::exit(1);
    }
}
