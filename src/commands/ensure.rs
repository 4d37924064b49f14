//! Ensure command implementation
//!
//! Non-interactive entry point used by the shell hook and direnv library:
//! succeed quietly when Nix is present, otherwise install it if the user has
//! allowed that.

use semver::VersionReq;

use crate::cli::EnsureArgs;
use crate::consent::{AssumeYes, Consent, PromptConsent};
use crate::error::{KindlingError, Result};
use crate::shell::AUTO_INSTALL_ENV;
use crate::stages::{StageContext, nix};
use crate::ui;

use super::helpers::{Session, wsl_without_systemd};

/// Whether a missing Nix may be installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoInstall {
    Yes,
    No,
    /// First run: ask and remember the answer
    Ask,
}

/// `KINDLING_AUTO_INSTALL=1` wins, then `auto_install` from the config file.
pub fn auto_install_policy(env_value: Option<&str>, configured: Option<bool>) -> AutoInstall {
    if env_value == Some("1") {
        return AutoInstall::Yes;
    }
    match configured {
        Some(true) => AutoInstall::Yes,
        Some(false) => AutoInstall::No,
        None => AutoInstall::Ask,
    }
}

pub fn parse_requirement(value: &str) -> Result<VersionReq> {
    VersionReq::parse(value).map_err(|e| KindlingError::InvalidVersionRequirement {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Run ensure command
pub fn run(args: EnsureArgs) -> Result<()> {
    let required = args.version.as_deref().map(parse_requirement).transpose()?;

    let session = Session::open()?;
    let mut resolver = session.resolver()?;
    let mut ctx = StageContext::new(
        &session.layout,
        session.target,
        &mut resolver,
        &session.runner,
        &AssumeYes,
        &session.config,
    );
    ctx.no_confirm = true;
    ctx.wsl_without_systemd = wsl_without_systemd();

    let status = nix::status(&ctx)?;
    if status.installed {
        return match (&required, &status.version) {
            (Some(req), Some(version)) if !req.matches(version) => {
                Err(KindlingError::NixVersionMismatch {
                    installed: version.to_string(),
                    required: req.to_string(),
                })
            }
            _ => Ok(()),
        };
    }

    let env_value = std::env::var(AUTO_INSTALL_ENV).ok();
    match auto_install_policy(env_value.as_deref(), session.config.auto_install) {
        AutoInstall::Yes => {}
        AutoInstall::No => {
            ui::info("Nix is not installed and auto-install is disabled");
            ui::info("Run `kindling install` to install it manually");
            return Err(KindlingError::NixNotInstalled);
        }
        AutoInstall::Ask => {
            let accepted = PromptConsent.confirm("Nix is not installed. Install it now")?;
            session.store.save_auto_install(accepted)?;
            if !accepted {
                ui::info("Run `kindling install` when you're ready");
                return Err(KindlingError::ConsentDenied {
                    action: "Install Nix".to_string(),
                });
            }
        }
    }

    let backend = session.config.backend();
    let installed = nix::install(&mut ctx, backend)?;
    ui::ok(format!("Nix installed at {}", installed.path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_config() {
        assert_eq!(auto_install_policy(Some("1"), Some(false)), AutoInstall::Yes);
        assert_eq!(auto_install_policy(Some("0"), Some(false)), AutoInstall::No);
    }

    #[test]
    fn test_config_decides_without_env() {
        assert_eq!(auto_install_policy(None, Some(true)), AutoInstall::Yes);
        assert_eq!(auto_install_policy(None, Some(false)), AutoInstall::No);
        assert_eq!(auto_install_policy(None, None), AutoInstall::Ask);
    }

    #[test]
    fn test_parse_requirement() {
        let req = parse_requirement(">=2.24").unwrap();
        assert!(req.matches(&semver::Version::new(2, 24, 12)));
        assert!(!req.matches(&semver::Version::new(2, 18, 1)));

        let err = parse_requirement("two-ish").unwrap_err();
        assert!(matches!(err, KindlingError::InvalidVersionRequirement { .. }));
    }
}
