//! Platform detection
//!
//! Normalizes raw OS and architecture strings (as reported by
//! `std::env::consts` or `uname`) into a canonical [`Target`]. Detection is
//! pure: it performs no I/O and fails with
//! [`KindlingError::UnsupportedPlatform`] before anything else happens.
//!
//! Host probes that do touch the file system (WSL, systemd) live in [`host`].

pub mod host;

use std::fmt;

use serde::Serialize;

use crate::error::{KindlingError, Result};

/// Environment variable overriding the detected OS name
pub const OS_OVERRIDE_ENV: &str = "KINDLING_OS";

/// Environment variable overriding the detected architecture
pub const ARCH_OVERRIDE_ENV: &str = "KINDLING_ARCH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    MacOS,
    Linux,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86_64,
    Aarch64,
}

/// Supervisor family a target belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// macOS: launchd agents, newsyslog rotation
    Apple,
    /// Linux: systemd user units
    Linux,
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Apple => write!(f, "apple"),
            OsFamily::Linux => write!(f, "linux"),
        }
    }
}

impl std::str::FromStr for OsFamily {
    type Err = KindlingError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "apple" | "macos" | "darwin" => Ok(OsFamily::Apple),
            "linux" => Ok(OsFamily::Linux),
            other => Err(KindlingError::UnsupportedPlatform {
                os: other.to_string(),
                arch: "any".to_string(),
            }),
        }
    }
}

/// Canonical download target, e.g. `aarch64-apple-darwin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    pub os: Os,
    pub arch: Arch,
}

impl Target {
    /// Detect the target of the running process.
    ///
    /// `KINDLING_OS` and `KINDLING_ARCH` replace the compiled-in values when set.
    pub fn current() -> Result<Self> {
        let os = std::env::var(OS_OVERRIDE_ENV).unwrap_or_else(|_| std::env::consts::OS.into());
        let arch =
            std::env::var(ARCH_OVERRIDE_ENV).unwrap_or_else(|_| std::env::consts::ARCH.into());
        detect(&os, &arch)
    }

    pub fn family(&self) -> OsFamily {
        match self.os {
            Os::MacOS => OsFamily::Apple,
            Os::Linux => OsFamily::Linux,
        }
    }

    pub fn arch_str(&self) -> &'static str {
        match self.arch {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        }
    }

    /// Vendor/OS/libc suffix appended to the architecture.
    fn suffix(&self) -> &'static str {
        match self.os {
            Os::MacOS => "apple-darwin",
            Os::Linux => "unknown-linux-musl",
        }
    }

    /// Nix system double (`x86_64-linux`, `aarch64-darwin`), used by nix-installer artifacts.
    pub fn nix_system(&self) -> String {
        let os = match self.os {
            Os::MacOS => "darwin",
            Os::Linux => "linux",
        };
        format!("{}-{}", self.arch_str(), os)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.arch_str(), self.suffix())
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Map raw OS and machine strings to a [`Target`].
pub fn detect(os: &str, arch: &str) -> Result<Target> {
    let unsupported = || KindlingError::UnsupportedPlatform {
        os: os.to_string(),
        arch: arch.to_string(),
    };

    let os_kind = match normalize(os).as_str() {
        "macos" | "darwin" | "osx" => Os::MacOS,
        "linux" => Os::Linux,
        _ => return Err(unsupported()),
    };

    let arch_kind = match normalize(arch).as_str() {
        "x86_64" | "amd64" | "x64" => Arch::X86_64,
        "aarch64" | "arm64" => Arch::Aarch64,
        _ => return Err(unsupported()),
    };

    Ok(Target {
        os: os_kind,
        arch: arch_kind,
    })
}

#[cfg(test)]
mod tests;
