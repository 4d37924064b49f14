//! Nix stage: the foundation every later stage installs through

use tracing::info;

use crate::config::Backend;
use crate::error::{Result, resolve};
use crate::resolver::{Resolved, Via};

use super::{Stage, StageContext, StageOutcome};

pub struct NixStage;

impl Stage for NixStage {
    fn name(&self) -> &'static str {
        "nix"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome> {
        if let Some(found) = ctx.resolver.locate(&ctx.catalog.nix()) {
            info!(path = %found.path.display(), via = %found.via, "nix present");
            if found.via != Via::SearchPath {
                ctx.resolver.activate(&found);
            }
            return Ok(StageOutcome::unchanged());
        }

        let backend = ctx.config.backend();
        let nix = install(ctx, backend)?;

        let mut outcome = StageOutcome::default();
        outcome.push(format!(
            "Installed Nix ({backend}) at {}",
            nix.path.display()
        ));
        Ok(outcome)
    }
}

/// Download nix-installer for the host and run it.
///
/// Returns the freshly installed `nix`.
pub fn install(ctx: &mut StageContext<'_>, backend: Backend) -> Result<Resolved> {
    ctx.require_consent("Install Nix")?;

    let installer = ctx
        .resolver
        .resolve(&ctx.catalog.nix_installer(backend), &ctx.target)?;
    info!(path = %installer.path.display(), via = %installer.via, %backend, "running nix-installer");

    let run = ctx
        .command(&installer.path)
        .args(installer_args(ctx.no_confirm, ctx.wsl_without_systemd));
    ctx.runner.run_checked(&run)?;

    ctx.activate_profiles();
    ctx.resolver.locate(&ctx.catalog.nix()).ok_or_else(|| {
        resolve::failed(
            "nix",
            "nix-installer finished but nix was not found; restart your shell",
        )
    })
}

/// Arguments for `nix-installer`.
pub fn installer_args(no_confirm: bool, wsl_without_systemd: bool) -> Vec<&'static str> {
    let mut args = vec!["install"];
    if no_confirm {
        args.push("--no-confirm");
    }
    if wsl_without_systemd {
        args.extend(["--init", "none"]);
    }
    args
}

/// What `kindling check` reports about Nix
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NixStatus {
    pub installed: bool,
    pub version: Option<semver::Version>,
    pub path: Option<std::path::PathBuf>,
}

/// Locate nix without installing anything and ask it for its version.
pub fn status(ctx: &StageContext<'_>) -> Result<NixStatus> {
    let Some(nix) = ctx.resolver.locate(&ctx.catalog.nix()) else {
        return Ok(NixStatus {
            installed: false,
            version: None,
            path: None,
        });
    };

    let captured = ctx.runner.capture(&ctx.command(&nix.path).arg("--version"))?;
    let version = if captured.success {
        parse_version(&captured.stdout)
    } else {
        None
    };

    Ok(NixStatus {
        installed: true,
        version,
        path: Some(nix.path),
    })
}

/// Parse `nix --version` output such as `nix (Nix) 2.24.12`.
///
/// Pre-release suffixes (`2.25.0pre20240920`) and two-part versions are
/// reduced to their numeric core.
pub fn parse_version(output: &str) -> Option<semver::Version> {
    let word = output.split_whitespace().last()?;
    if let Ok(version) = semver::Version::parse(word) {
        return Some(version);
    }

    let numeric: String = word
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts = numeric
        .trim_end_matches('.')
        .split('.')
        .map(|p| p.parse::<u64>().ok());
    let major = parts.next()??;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    Some(semver::Version::new(major, minor, patch))
}

#[cfg(test)]
mod version_tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("nix (Nix) 2.24.12\n"),
            Some(semver::Version::new(2, 24, 12))
        );
        assert_eq!(
            parse_version("nix (Determinate Nix 3.1.0) 2.26.3"),
            Some(semver::Version::new(2, 26, 3))
        );
        assert_eq!(
            parse_version("nix (Nix) 2.25.0pre20240920_dirty"),
            Some(semver::Version::new(2, 25, 0))
        );
        assert_eq!(parse_version("nix (Nix) 2.18"), Some(semver::Version::new(2, 18, 0)));
        assert_eq!(parse_version(""), None);
        assert_eq!(parse_version("nix (Nix) unknown"), None);
    }
}
