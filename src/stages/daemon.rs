//! Daemon stage: supervise `kindling daemon` under launchd or systemd

use tracing::info;

use crate::error::Result;
use crate::service::{self, DaemonSpec};

use super::{Stage, StageContext, StageOutcome};

pub struct DaemonStage;

impl Stage for DaemonStage {
    fn name(&self) -> &'static str {
        "daemon"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::default();

        let kindling = ctx.resolver.resolve(&ctx.catalog.kindling(), &ctx.target)?;
        info!(path = %kindling.path.display(), via = %kindling.via, "daemon binary");

        let family = ctx.target.family();
        let config = ctx.config.daemon_or_default();
        config.validate()?;

        let spec = DaemonSpec::for_layout(ctx.layout, family, kindling.path, config);
        let compiled = service::compile(&spec, family)?;

        if !compiled.primary().path.exists() {
            ctx.require_consent(&format!("Install the kindling daemon as a {family} service"))?;
        }

        let summary = service::install(&compiled, ctx.runner)?;
        for path in &summary.written {
            outcome.push(format!("Wrote {}", path.display()));
        }
        if summary.reloaded {
            outcome.push("Reloaded the daemon service");
        }

        Ok(outcome)
    }
}
