//! Service compiler
//!
//! Turns one [`DaemonSpec`] into the files the host's supervisor needs:
//! - Apple: a launchd agent, plus a newsyslog rule for its logs and a second
//!   agent that applies the rule periodically
//! - Linux: a systemd user unit (journald handles the logs)
//!
//! Both also get the daemon's rendered TOML config. [`compile`] is pure; writing
//! the files and reloading the supervisor is [`install::install`].

pub mod install;
pub mod launchd;
pub mod render;
pub mod systemd;

use std::path::PathBuf;

use crate::config::DaemonConfig;
use crate::error::Result;
use crate::paths::Layout;
use crate::platform::OsFamily;

pub use install::install;

/// launchd label of the daemon agent
pub const DEFAULT_LABEL: &str = "io.pleme.kindling";

/// Log file names under the daemon's log directory
pub const STDOUT_LOG: &str = "daemon.out.log";
pub const STDERR_LOG: &str = "daemon.err.log";

/// Everything needed to run the daemon under a supervisor
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonSpec {
    pub label: String,
    pub binary: PathBuf,
    pub args: Vec<String>,
    pub config: DaemonConfig,
    pub config_path: PathBuf,
    pub log_dir: PathBuf,
    pub supervisor_dir: PathBuf,
}

impl DaemonSpec {
    /// Spec running `binary daemon --config <daemon.toml>` with the layout's paths.
    pub fn for_layout(
        layout: &Layout,
        family: OsFamily,
        binary: PathBuf,
        config: DaemonConfig,
    ) -> Self {
        let config_path = layout.daemon_config_file();
        Self {
            label: DEFAULT_LABEL.to_string(),
            args: vec![
                "daemon".to_string(),
                "--config".to_string(),
                config_path.display().to_string(),
            ],
            binary,
            config,
            config_path,
            log_dir: layout.log_dir(family),
            supervisor_dir: layout.supervisor_dir(family),
        }
    }

    /// systemd unit name: the last component of the label.
    pub fn unit_name(&self) -> &str {
        self.label.rsplit('.').next().unwrap_or(&self.label)
    }

    fn program_arguments(&self) -> Vec<String> {
        std::iter::once(self.binary.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// A file to write with its permission bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
    pub mode: u32,
}

impl GeneratedFile {
    fn new(path: PathBuf, contents: String) -> Self {
        Self {
            path,
            contents,
            mode: 0o644,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRotation {
    /// newsyslog rule binding both daemon logs
    pub rule: GeneratedFile,
    /// Agent running newsyslog against the rule
    pub schedule: GeneratedFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppleAgentArtifact {
    pub agent: GeneratedFile,
    pub rotation: LogRotation,
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxUnitArtifact {
    pub unit: GeneratedFile,
    pub unit_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorArtifact {
    AppleAgent(AppleAgentArtifact),
    LinuxUnit(LinuxUnitArtifact),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledService {
    pub supervisor: SupervisorArtifact,
    pub config_file: GeneratedFile,
}

impl CompiledService {
    /// Every file to write, config first.
    pub fn files(&self) -> Vec<&GeneratedFile> {
        let mut files = vec![&self.config_file];
        match &self.supervisor {
            SupervisorArtifact::AppleAgent(apple) => {
                files.extend([&apple.agent, &apple.rotation.rule, &apple.rotation.schedule]);
            }
            SupervisorArtifact::LinuxUnit(linux) => files.push(&linux.unit),
        }
        files
    }

    /// The file the supervisor loads the daemon from.
    pub fn primary(&self) -> &GeneratedFile {
        match &self.supervisor {
            SupervisorArtifact::AppleAgent(apple) => &apple.agent,
            SupervisorArtifact::LinuxUnit(linux) => &linux.unit,
        }
    }
}

/// Generate the supervisor artifacts and rendered config for `family`.
pub fn compile(spec: &DaemonSpec, family: OsFamily) -> Result<CompiledService> {
    let config_file = GeneratedFile {
        mode: 0o600,
        ..GeneratedFile::new(spec.config_path.clone(), render::render_config(&spec.config)?)
    };

    let supervisor = match family {
        OsFamily::Apple => SupervisorArtifact::AppleAgent(compile_apple(spec)),
        OsFamily::Linux => SupervisorArtifact::LinuxUnit(compile_linux(spec)),
    };

    Ok(CompiledService {
        supervisor,
        config_file,
    })
}

fn compile_apple(spec: &DaemonSpec) -> AppleAgentArtifact {
    let stdout = spec.log_dir.join(STDOUT_LOG);
    let stderr = spec.log_dir.join(STDERR_LOG);
    let rule_path = spec.log_dir.join("newsyslog.conf");
    let rotation_label = format!("{}.logrotate", spec.label);

    let agent = launchd::render_agent(&launchd::Agent {
        label: &spec.label,
        program_arguments: &spec.program_arguments(),
        keep_alive: true,
        start_interval: None,
        stdout: Some(&stdout),
        stderr: Some(&stderr),
    });

    let schedule = launchd::render_agent(&launchd::Agent {
        label: &rotation_label,
        program_arguments: &[
            launchd::NEWSYSLOG.to_string(),
            "-f".to_string(),
            rule_path.display().to_string(),
        ],
        keep_alive: false,
        start_interval: Some(launchd::ROTATION_INTERVAL_SECS),
        stdout: None,
        stderr: None,
    });

    AppleAgentArtifact {
        agent: GeneratedFile::new(
            spec.supervisor_dir.join(format!("{}.plist", spec.label)),
            agent,
        ),
        rotation: LogRotation {
            rule: GeneratedFile::new(
                rule_path,
                launchd::render_rotation_rule(&[stdout.as_path(), stderr.as_path()]),
            ),
            schedule: GeneratedFile::new(
                spec.supervisor_dir.join(format!("{rotation_label}.plist")),
                schedule,
            ),
        },
        log_dir: spec.log_dir.clone(),
    }
}

fn compile_linux(spec: &DaemonSpec) -> LinuxUnitArtifact {
    let unit_name = format!("{}.service", spec.unit_name());
    let unit = systemd::render_unit(&systemd::Unit {
        description: "kindling node daemon",
        exec_start: &spec.program_arguments(),
    });
    LinuxUnitArtifact {
        unit: GeneratedFile::new(spec.supervisor_dir.join(&unit_name), unit),
        unit_name,
    }
}

#[cfg(test)]
mod tests;
