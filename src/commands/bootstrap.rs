//! Bootstrap command implementation

use crate::cli::BootstrapArgs;
use crate::consent;
use crate::error::Result;
use crate::stages::node::NodeSource;
use crate::stages::{Orchestrator, Skips, StageContext};
use crate::ui::{self, ConsoleReporter, display};

use super::helpers::{Session, host_name, login_shell, login_user, wsl_without_systemd};

/// Node identity requested by the flags, if any.
///
/// Only `--profile` or `--node-config` enables the node stage; the other
/// identity flags refine a profile-built identity.
pub fn node_source(
    args: &BootstrapArgs,
    host: impl FnOnce() -> Option<String>,
    user: impl FnOnce() -> Option<String>,
) -> Option<NodeSource> {
    if let Some(path) = &args.node_config {
        return Some(NodeSource::File(path.clone()));
    }
    let profile = args.profile.as_deref()?;
    Some(NodeSource::Flags {
        profile: profile.to_string(),
        hostname: args
            .hostname
            .clone()
            .or_else(host)
            .unwrap_or_else(|| "localhost".to_string()),
        user: args
            .user
            .clone()
            .or_else(user)
            .unwrap_or_else(|| "user".to_string()),
        age_key_file: args.age_key_file.clone(),
    })
}

/// Run bootstrap command
pub fn run(args: BootstrapArgs) -> Result<()> {
    let session = Session::open()?;
    let mut resolver = session.resolver()?;
    let consent = consent::for_flags(args.no_confirm);
    let node = node_source(&args, host_name, login_user);

    let mut ctx = StageContext::new(
        &session.layout,
        session.target,
        &mut resolver,
        &session.runner,
        consent.as_ref(),
        &session.config,
    );
    ctx.no_confirm = args.no_confirm;
    ctx.org = args.org;
    ctx.shell = login_shell();
    ctx.wsl_without_systemd = wsl_without_systemd();

    let skips = Skips {
        nix: args.skip_nix,
        direnv: args.skip_direnv,
        tend: args.skip_tend,
        node: node.is_none(),
        daemon: args.skip_daemon,
    };
    ctx.node = node;

    ui::info(format!("Bootstrapping {}", session.target));
    let report = Orchestrator::standard(&skips).run(&mut ctx, &mut ConsoleReporter)?;
    display::display_report(&report);
    report.ensure_complete()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn no_host() -> Option<String> {
        None
    }

    #[test]
    fn test_no_identity_flags_means_no_node_stage() {
        let args = BootstrapArgs {
            hostname: Some("forge".to_string()),
            ..BootstrapArgs::default()
        };
        assert_eq!(node_source(&args, no_host, no_host), None);
    }

    #[test]
    fn test_profile_fills_host_and_user_defaults() {
        let args = BootstrapArgs {
            profile: Some("linux-server".to_string()),
            ..BootstrapArgs::default()
        };
        let source = node_source(&args, || Some("forge".to_string()), || Some("ada".to_string()));
        assert_eq!(
            source,
            Some(NodeSource::Flags {
                profile: "linux-server".to_string(),
                hostname: "forge".to_string(),
                user: "ada".to_string(),
                age_key_file: None,
            })
        );

        match node_source(&args, no_host, no_host) {
            Some(NodeSource::Flags { hostname, user, .. }) => {
                assert_eq!(hostname, "localhost");
                assert_eq!(user, "user");
            }
            other => panic!("expected flags source, got {other:?}"),
        }
    }

    #[test]
    fn test_node_config_wins() {
        let args = BootstrapArgs {
            node_config: Some(PathBuf::from("/srv/node.yaml")),
            ..BootstrapArgs::default()
        };
        assert_eq!(
            node_source(&args, no_host, no_host),
            Some(NodeSource::File(PathBuf::from("/srv/node.yaml")))
        );
    }
}
