//! Error types and handling for kindling
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostic codes and
//! help text. Lower layers (platform detection, artifact resolution) return the
//! most specific variant; the stage orchestrator wraps failures with the stage
//! name via [`KindlingError::StageFailed`].
//!
//! Convenience constructors live in sub-modules by error domain:
//! - [`resolve`]: resolution and download errors
//! - [`fs`]: file system errors

pub mod fs;
pub mod resolve;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for kindling operations
#[derive(Error, Diagnostic, Debug)]
pub enum KindlingError {
    // Platform errors
    #[error("Unsupported platform: {os}/{arch}")]
    #[diagnostic(
        code(kindling::platform::unsupported),
        help("Supported platforms: macOS and Linux on x86_64 or aarch64")
    )]
    UnsupportedPlatform { os: String, arch: String },

    // Resolution errors
    #[error("Could not resolve '{tool}': {reason}")]
    #[diagnostic(code(kindling::resolve::failed))]
    ResolutionFailed { tool: String, reason: String },

    #[error("Download failed from {url}: {reason}")]
    #[diagnostic(
        code(kindling::resolve::download_failed),
        help("Check your network connection and re-run the command")
    )]
    DownloadFailed { url: String, reason: String },

    // Orchestration errors
    #[error("Stage '{stage}' failed: {source}")]
    #[diagnostic(code(kindling::stage::failed))]
    StageFailed {
        stage: String,
        #[source]
        source: Box<KindlingError>,
    },

    #[error("Bootstrap incomplete: {stages} failed")]
    #[diagnostic(
        code(kindling::stage::incomplete),
        help("Fix the failed stages and re-run `kindling bootstrap`")
    )]
    BootstrapIncomplete { stages: String },

    #[error("Declined: {action}")]
    #[diagnostic(
        code(kindling::consent::denied),
        help("Re-run with --no-confirm to accept all prompts")
    )]
    ConsentDenied { action: String },

    #[error("Command '{program}' failed: {reason}")]
    #[diagnostic(code(kindling::command::failed))]
    CommandFailed { program: String, reason: String },

    // Nix errors
    #[error("Nix is not installed")]
    #[diagnostic(
        code(kindling::nix::not_installed),
        help("Run 'kindling install' to install Nix")
    )]
    NixNotInstalled,

    #[error("Nix {installed} is installed but {required} is required")]
    #[diagnostic(
        code(kindling::nix::version_mismatch),
        help("Upgrade Nix or relax the --version requirement")
    )]
    NixVersionMismatch { installed: String, required: String },

    #[error("nix-installer receipt not found at {searched}")]
    #[diagnostic(
        code(kindling::nix::installer_not_found),
        help("Was Nix installed with kindling or nix-installer?")
    )]
    InstallerNotFound { searched: String },

    #[error("Unknown shell: {shell}")]
    #[diagnostic(
        code(kindling::cli::unknown_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    UnknownShell { shell: String },

    // Configuration errors
    #[error("Unknown backend '{value}'")]
    #[diagnostic(
        code(kindling::config::invalid_backend),
        help("Expected 'upstream' or 'determinate'")
    )]
    InvalidBackend { value: String },

    #[error("Invalid version requirement '{value}': {reason}")]
    #[diagnostic(
        code(kindling::config::invalid_version),
        help("Use a semver range such as '>=2.24'")
    )]
    InvalidVersionRequirement { value: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(kindling::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Failed to read configuration file: {path}: {reason}")]
    #[diagnostic(code(kindling::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to write configuration file: {path}: {reason}")]
    #[diagnostic(code(kindling::config::write_failed))]
    ConfigWriteFailed { path: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(kindling::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(kindling::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Could not determine {what} directory")]
    #[diagnostic(
        code(kindling::fs::directory_unavailable),
        help("Set HOME, or KINDLING_CONFIG_DIR / KINDLING_DATA_DIR explicitly")
    )]
    DirectoryUnavailable { what: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(kindling::fs::io_error))]
    IoError { message: String },
}

impl KindlingError {
    /// Wrap an error with the name of the stage it occurred in.
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        KindlingError::StageFailed {
            stage: stage.into(),
            source: Box::new(self),
        }
    }
}

impl From<std::io::Error> for KindlingError {
    fn from(err: std::io::Error) -> Self {
        KindlingError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for KindlingError {
    fn from(err: toml::de::Error) -> Self {
        KindlingError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for KindlingError {
    fn from(err: toml::ser::Error) -> Self {
        KindlingError::ConfigWriteFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for KindlingError {
    fn from(err: serde_yaml::Error) -> Self {
        KindlingError::ConfigWriteFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for KindlingError {
    fn from(err: serde_json::Error) -> Self {
        KindlingError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for KindlingError {
    fn from(err: inquire::InquireError) -> Self {
        KindlingError::IoError {
            message: format!("Failed to read confirmation: {err}"),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, KindlingError>;
