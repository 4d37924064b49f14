//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Backend;
use crate::platform::OsFamily;

/// kindling - developer machine bootstrapper
///
/// Takes a bare machine to a configured development environment.
#[derive(Parser, Debug)]
#[command(
    name = "kindling",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Bootstrap Nix, direnv, tend and the kindling daemon",
    long_about = "kindling takes a bare macOS or Linux machine to a configured development \
                  environment: it installs Nix, hooks direnv into your shell, syncs tend \
                  workspaces and supervises the kindling node daemon.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  kindling bootstrap --org pleme-io\n    \
                  kindling check\n    \
                  kindling ensure --version '>=2.24'\n    \
                  kindling service print --os apple\n\n\
                  \x1b[1m\x1b[32mDocumentation:\x1b[0m\n    \
                  https://github.com/pleme-io/kindling"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set up the machine: nix, direnv, tend, daemon
    Bootstrap(BootstrapArgs),

    /// Install Nix
    Install(InstallArgs),

    /// Report whether Nix is installed
    Check(CheckArgs),

    /// Make sure Nix is installed, installing it if allowed
    Ensure(EnsureArgs),

    /// Uninstall Nix
    Uninstall,

    /// Run the node daemon
    Daemon(DaemonArgs),

    /// Generate or install the daemon's supervisor files
    #[command(subcommand)]
    Service(ServiceCommand),

    /// Shell fast path; prints lines to eval
    Hook,

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the bootstrap command
#[derive(Parser, Debug, Default)]
#[command(after_help = "EXAMPLES:\n  \
                   Full bootstrap:\n    kindling bootstrap\n\n\
                   Unattended, with a tend workspace:\n    kindling bootstrap --org pleme-io --no-confirm\n\n\
                   Only Nix and direnv:\n    kindling bootstrap --skip-tend --skip-daemon\n\n\
                   Record this machine's identity:\n    kindling bootstrap --profile linux-server --hostname forge")]
pub struct BootstrapArgs {
    /// Skip the Nix stage
    #[arg(long)]
    pub skip_nix: bool,

    /// Skip the direnv stage
    #[arg(long)]
    pub skip_direnv: bool,

    /// Skip the tend stage
    #[arg(long)]
    pub skip_tend: bool,

    /// Skip the daemon stage
    #[arg(long)]
    pub skip_daemon: bool,

    /// GitHub organization for a starter tend workspace
    #[arg(long, value_name = "ORG")]
    pub org: Option<String>,

    /// Profile for the node identity; enables the node stage
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Host name for the node identity (default: this machine's)
    #[arg(long, value_name = "HOST")]
    pub hostname: Option<String>,

    /// User for the node identity (default: $USER)
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// age key file for the node identity's secrets
    #[arg(long, value_name = "PATH")]
    pub age_key_file: Option<PathBuf>,

    /// Copy an existing node.yaml instead of building one from flags
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with_all = ["profile", "hostname", "user", "age_key_file"]
    )]
    pub node_config: Option<PathBuf>,

    /// Accept every prompt
    #[arg(long)]
    pub no_confirm: bool,
}

/// Arguments for the install command
#[derive(Parser, Debug, Default)]
pub struct InstallArgs {
    /// Installer distribution (upstream, determinate); defaults to the config file's
    #[arg(long)]
    pub backend: Option<Backend>,

    /// Do not prompt
    #[arg(long)]
    pub no_confirm: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Arguments for the check command
#[derive(Parser, Debug, Default)]
pub struct CheckArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Arguments for the ensure command
#[derive(Parser, Debug, Default)]
pub struct EnsureArgs {
    /// Required Nix version (semver requirement, e.g. '>=2.24')
    #[arg(long, value_name = "CONSTRAINT")]
    pub version: Option<String>,
}

/// Arguments for the daemon command
#[derive(Parser, Debug, Default)]
pub struct DaemonArgs {
    /// Daemon config file
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the HTTP listen address
    #[arg(long)]
    pub http_addr: Option<String>,

    /// Override the gRPC listen address
    #[arg(long)]
    pub grpc_addr: Option<String>,

    /// Override the log level
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the effective config and exit
    #[arg(long)]
    pub check: bool,
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    /// Print the generated files without writing them
    Print {
        /// Supervisor family (apple, linux); defaults to the host's
        #[arg(long)]
        os: Option<OsFamily>,
    },

    /// Write the generated files and reload the supervisor
    Install {
        /// Do not prompt
        #[arg(long)]
        no_confirm: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    kindling completions --shell bash > ~/.bash_completion.d/kindling\n\n\
                  Generate zsh completions:\n    kindling completions --shell zsh > ~/.zfunc/_kindling\n\n\
                  Generate fish completions:\n    kindling completions --shell fish > ~/.config/fish/completions/kindling.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long, short = 's')]
    pub shell: String,
}
