//! Shared state handed to every stage

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::consent::Consent;
use crate::error::{KindlingError, Result, resolve};
use crate::paths::Layout;
use crate::platform::Target;
use crate::resolver::{Resolved, Resolver, ToolSpec};
use crate::runner::{CommandRunner, Invocation};
use crate::tools::Catalog;

use super::node::NodeSource;

pub struct StageContext<'a> {
    pub layout: &'a Layout,
    pub target: Target,
    pub catalog: Catalog,
    pub resolver: &'a mut Resolver,
    pub runner: &'a dyn CommandRunner,
    pub consent: &'a dyn Consent,
    pub config: &'a Config,
    /// Pass non-interactive flags to invoked installers
    pub no_confirm: bool,
    /// Organization for the starter tend workspace
    pub org: Option<String>,
    /// Login shell program name (`zsh`, `bash`, `fish`)
    pub shell: Option<String>,
    /// Running under WSL without systemd; nix-installer needs `--init none`
    pub wsl_without_systemd: bool,
    /// Node identity to record, when one was asked for
    pub node: Option<NodeSource>,
}

impl<'a> StageContext<'a> {
    pub fn new(
        layout: &'a Layout,
        target: Target,
        resolver: &'a mut Resolver,
        runner: &'a dyn CommandRunner,
        consent: &'a dyn Consent,
        config: &'a Config,
    ) -> Self {
        Self {
            layout,
            target,
            catalog: Catalog::new(layout),
            resolver,
            runner,
            consent,
            config,
            no_confirm: false,
            org: None,
            shell: None,
            wsl_without_systemd: false,
            node: None,
        }
    }

    /// Fail with `ConsentDenied` unless the user agrees to `action`.
    pub fn require_consent(&self, action: &str) -> Result<()> {
        if self.consent.confirm(action)? {
            Ok(())
        } else {
            Err(KindlingError::ConsentDenied {
                action: action.to_string(),
            })
        }
    }

    /// Invocation of `program` that sees the resolver's search path as `PATH`.
    pub fn command(&self, program: &Path) -> Invocation {
        Invocation::new(program).env("PATH", self.resolver.search_path().to_env())
    }

    /// Make tools installed into the Nix profiles visible to later lookups.
    pub fn activate_profiles(&mut self) {
        for dir in self.catalog.profile_bin_dirs().iter().rev() {
            self.resolver.prepend_dir(dir);
        }
    }

    /// Locate `tool`, installing `installable` into the Nix profile if it is missing.
    ///
    /// Returns the resolved tool and whether an install happened.
    pub fn ensure_profile_tool(
        &mut self,
        tool: &ToolSpec,
        installable: &str,
    ) -> Result<(Resolved, bool)> {
        if let Some(found) = self.resolver.locate(tool) {
            return Ok((found, false));
        }

        self.require_consent(&format!("Install {} via nix profile", tool.name))?;

        let nix = self
            .resolver
            .locate(&self.catalog.nix())
            .ok_or(KindlingError::NixNotInstalled)?;

        info!(tool = %tool.name, installable, "installing via nix profile");
        let install = self
            .command(&nix.path)
            .args(["profile", "install", "--extra-experimental-features"])
            .arg("nix-command flakes")
            .arg(installable);
        self.runner.run_checked(&install)?;

        self.activate_profiles();
        let found = self.resolver.locate(tool).ok_or_else(|| {
            resolve::failed(
                &tool.name,
                format!("not found after `nix profile install {installable}`"),
            )
        })?;
        Ok((found, true))
    }
}
