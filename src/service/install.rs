//! Writing compiled service files and reloading the supervisor

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{Result, fs::write_failed};
use crate::files::{set_mode, write_if_changed};
use crate::runner::{CommandRunner, Invocation};

use super::{CompiledService, SupervisorArtifact};

/// Paths written and paths already up to date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallSummary {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub reloaded: bool,
}

impl InstallSummary {
    pub fn changed(&self) -> bool {
        !self.written.is_empty()
    }
}

/// Create or replace the compiled files, then reload the supervisor if anything changed.
pub fn install(compiled: &CompiledService, runner: &dyn CommandRunner) -> Result<InstallSummary> {
    let mut summary = InstallSummary::default();

    if let SupervisorArtifact::AppleAgent(apple) = &compiled.supervisor {
        fs::create_dir_all(&apple.log_dir).map_err(|e| write_failed(&apple.log_dir, e))?;
    }

    for file in compiled.files() {
        if write_if_changed(&file.path, &file.contents)? {
            set_mode(&file.path, file.mode)?;
            info!(path = %file.path.display(), "wrote");
            summary.written.push(file.path.clone());
        } else {
            debug!(path = %file.path.display(), "unchanged");
            summary.unchanged.push(file.path.clone());
        }
    }

    if summary.changed() {
        reload(compiled, runner)?;
        summary.reloaded = true;
    }

    Ok(summary)
}

fn reload(compiled: &CompiledService, runner: &dyn CommandRunner) -> Result<()> {
    match &compiled.supervisor {
        SupervisorArtifact::AppleAgent(apple) => {
            for plist in [&apple.agent.path, &apple.rotation.schedule.path] {
                let path = plist.display().to_string();
                // Not loaded yet on first install; unload failing is expected.
                runner.run(&Invocation::new("launchctl").args(["unload", path.as_str()]))?;
                runner.run_checked(&Invocation::new("launchctl").args(["load", "-w", path.as_str()]))?;
            }
        }
        SupervisorArtifact::LinuxUnit(linux) => {
            runner.run_checked(&Invocation::new("systemctl").args(["--user", "daemon-reload"]))?;
            runner.run_checked(&Invocation::new("systemctl").args([
                "--user",
                "enable",
                "--now",
                linux.unit_name.as_str(),
            ]))?;
        }
    }
    Ok(())
}
