//! Bootstrap stages and their orchestration
//!
//! A bootstrap is an ordered list of [`StageSpec`]s. Each stage is idempotent:
//! it detects what is already in place and only acts on what is missing. The
//! [`Orchestrator`] runs stages strictly in declared order and applies each
//! stage's declared [`FailurePolicy`] when one fails.

pub mod context;
pub mod daemon;
pub mod direnv;
pub mod nix;
pub mod node;
pub mod tend;

use tracing::{info, warn};

use crate::error::{KindlingError, Result};
use crate::ui::StageReporter;

pub use context::StageContext;

/// One step of the bootstrap
pub trait Stage {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome>;
}

/// What a successful stage did; no actions means everything was already in place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutcome {
    pub actions: Vec<String>,
}

impl StageOutcome {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }
}

/// What happens to the rest of the bootstrap when a stage fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop; later stages depend on this one
    Abort,
    /// Record the failure and run the next stage
    Continue,
}

pub struct StageSpec {
    pub position: usize,
    pub name: &'static str,
    pub skip: bool,
    pub policy: FailurePolicy,
    pub stage: Box<dyn Stage>,
}

impl StageSpec {
    pub fn new(stage: Box<dyn Stage>, policy: FailurePolicy) -> Self {
        Self {
            position: 0,
            name: stage.name(),
            skip: false,
            policy,
            stage,
        }
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Completed { actions: Vec<String> },
    Skipped,
    FailedContinued { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub position: usize,
    pub name: String,
    pub status: StageStatus,
}

/// Per-stage outcomes of a bootstrap run, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub records: Vec<StageRecord>,
}

impl BootstrapReport {
    pub fn has_failures(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r.status, StageStatus::FailedContinued { .. }))
    }

    /// Names of the stages that failed under the continue policy.
    pub fn failed_stages(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| matches!(r.status, StageStatus::FailedContinued { .. }))
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Fail when any stage failed, so the command exits non-zero.
    pub fn ensure_complete(&self) -> Result<()> {
        if !self.has_failures() {
            return Ok(());
        }
        Err(KindlingError::BootstrapIncomplete {
            stages: self.failed_stages().join(", "),
        })
    }

    #[cfg(test)]
    pub fn status_of(&self, name: &str) -> Option<&StageStatus> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.status)
    }
}

pub struct Orchestrator {
    stages: Vec<StageSpec>,
}

impl Orchestrator {
    /// Positions are assigned from declaration order, starting at 1.
    pub fn new(stages: Vec<StageSpec>) -> Self {
        let stages = stages
            .into_iter()
            .enumerate()
            .map(|(i, mut spec)| {
                spec.position = i + 1;
                spec
            })
            .collect();
        Self { stages }
    }

    /// The standard bootstrap: nix, direnv, tend, node, daemon.
    pub fn standard(skips: &Skips) -> Self {
        Self::new(vec![
            StageSpec::new(Box::new(nix::NixStage), FailurePolicy::Abort).skip(skips.nix),
            StageSpec::new(Box::new(direnv::DirenvStage), FailurePolicy::Continue)
                .skip(skips.direnv),
            StageSpec::new(Box::new(tend::TendStage), FailurePolicy::Continue).skip(skips.tend),
            StageSpec::new(Box::new(node::NodeStage), FailurePolicy::Continue).skip(skips.node),
            StageSpec::new(Box::new(daemon::DaemonStage), FailurePolicy::Continue)
                .skip(skips.daemon),
        ])
    }

    #[cfg(test)]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Run every stage in order.
    ///
    /// Returns `StageFailed` as soon as an `Abort` stage fails; stages after it
    /// are never invoked.
    pub fn run(
        &self,
        ctx: &mut StageContext<'_>,
        reporter: &mut dyn StageReporter,
    ) -> Result<BootstrapReport> {
        let total = self.stages.len();
        let mut report = BootstrapReport::default();

        for spec in &self.stages {
            let status = if spec.skip {
                info!(stage = spec.name, "skipped");
                StageStatus::Skipped
            } else {
                reporter.started(spec.position, total, spec.name);
                info!(stage = spec.name, position = spec.position, "starting");
                match spec.stage.run(ctx) {
                    Ok(outcome) => StageStatus::Completed {
                        actions: outcome.actions,
                    },
                    Err(e) => match spec.policy {
                        FailurePolicy::Abort => return Err(e.in_stage(spec.name)),
                        FailurePolicy::Continue => {
                            warn!(stage = spec.name, error = %e, "failed, continuing");
                            StageStatus::FailedContinued {
                                error: e.to_string(),
                            }
                        }
                    },
                }
            };

            let record = StageRecord {
                position: spec.position,
                name: spec.name.to_string(),
                status,
            };
            reporter.finished(&record);
            report.records.push(record);
        }

        Ok(report)
    }
}

/// Which standard stages to skip
#[derive(Debug, Clone, Copy, Default)]
pub struct Skips {
    pub nix: bool,
    pub direnv: bool,
    pub tend: bool,
    /// Set when no node identity was asked for
    pub node: bool,
    pub daemon: bool,
}
