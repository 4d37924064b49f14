//! tend stage: install tend, seed a workspace config, sync repositories

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, fs::write_failed};
use crate::files::write_if_changed;
use crate::tools::TEND_INSTALLABLE;

use super::{Stage, StageContext, StageOutcome};

/// tend's `config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TendConfig {
    pub workspaces: Vec<TendWorkspace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TendWorkspace {
    pub name: String,
    pub provider: String,
    pub base_dir: PathBuf,
    pub clone_method: String,
    pub discover: bool,
    pub org: String,
}

impl TendConfig {
    /// One GitHub workspace for `org`, cloned under `~/code/github/{org}`.
    pub fn starter(home: &Path, org: &str) -> Self {
        Self {
            workspaces: vec![TendWorkspace {
                name: org.to_string(),
                provider: "github".to_string(),
                base_dir: home.join("code").join("github").join(org),
                clone_method: "ssh".to_string(),
                discover: true,
                org: org.to_string(),
            }],
        }
    }
}

pub struct TendStage;

impl Stage for TendStage {
    fn name(&self) -> &'static str {
        "tend"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::default();

        let spec = ctx.catalog.tend();
        let (tend, installed) = ctx.ensure_profile_tool(&spec, TEND_INSTALLABLE)?;
        if installed {
            outcome.push(format!("Installed tend at {}", tend.path.display()));
        }

        let config_path = ctx.layout.tend_config_file();
        if let Some(org) = ctx.org.clone() {
            if !config_path.exists() {
                ctx.require_consent(&format!("Create a tend workspace for {org}"))?;
                let yaml = serde_yaml::to_string(&TendConfig::starter(ctx.layout.home(), &org))
                    .map_err(|e| write_failed(&config_path, e))?;
                write_if_changed(&config_path, &yaml)?;
                outcome.push(format!("Created tend config {}", config_path.display()));
            }
        }

        if !config_path.exists() {
            return Ok(outcome);
        }

        let sync = ctx.command(&tend.path).arg("sync");
        if ctx.runner.run(&sync)? {
            outcome.push("Synced tend workspaces");
        } else {
            warn!("tend sync exited non-zero");
            outcome.push("tend sync exited non-zero (ignored)");
        }

        Ok(outcome)
    }
}
