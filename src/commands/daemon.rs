//! Daemon command implementation
//!
//! Runs resident under launchd or systemd. The network APIs and telemetry push
//! live elsewhere; this process owns config loading, node identity, structured
//! logging and the store garbage-collection schedule.

use std::path::Path;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::DaemonArgs;
use crate::config::{DaemonConfig, store::load_from};
use crate::error::Result;
use crate::paths::Layout;
use crate::resolver::Resolver;
use crate::runner::{CommandRunner, Invocation, SystemRunner};
use crate::service::render::render_config;
use crate::tools::Catalog;

use super::helpers::host_name;

/// Load the daemon section of `path` and apply command line overrides.
pub fn effective_config(path: &Path, args: &DaemonArgs) -> Result<DaemonConfig> {
    let mut config = load_from(path)?.daemon_or_default();

    if let Some(addr) = &args.http_addr {
        config.http_addr.clone_from(addr);
    }
    if let Some(addr) = &args.grpc_addr {
        config.grpc_addr.clone_from(addr);
    }
    if let Some(level) = &args.log_level {
        config.log_level.clone_from(level);
    }

    config.validate()?;
    Ok(config)
}

/// Fill an empty node id from `detect`, normally the host name.
pub fn resolve_node_id(config: &mut DaemonConfig, detect: impl FnOnce() -> Option<String>) {
    if config.telemetry.node_id.is_empty() {
        config.telemetry.node_id = detect().unwrap_or_else(|| "unknown".to_string());
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(format!("kindling={level}"))
        .unwrap_or_else(|_| EnvFilter::new("kindling=info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run daemon command
pub fn run(args: DaemonArgs) -> Result<()> {
    let mut config = effective_config(&args.config, &args)?;
    resolve_node_id(&mut config, host_name);

    if args.check {
        print!("{}", render_config(&config)?);
        return Ok(());
    }

    init_logging(&config.log_level);
    info!(
        http_addr = %config.http_addr,
        grpc_addr = %config.grpc_addr,
        node_id = %config.telemetry.node_id,
        telemetry = config.telemetry.enabled,
        gc_secs = config.gc.schedule_secs,
        "daemon starting"
    );

    if config.gc.schedule_secs == 0 {
        info!("store gc disabled");
        loop {
            std::thread::park();
        }
    }

    let layout = Layout::discover()?;
    let catalog = Catalog::new(&layout);
    let resolver = Resolver::system()?;
    let interval = Duration::from_secs(config.gc.schedule_secs);
    loop {
        std::thread::sleep(interval);
        let Some(nix) = resolver.locate(&catalog.nix()) else {
            warn!("store gc skipped: nix not found");
            continue;
        };
        collect_garbage(&SystemRunner, &nix.path);
    }
}

fn collect_garbage(runner: &dyn CommandRunner, nix: &Path) {
    info!("store gc starting");
    match runner.capture(&Invocation::new(nix).args(["store", "gc"])) {
        Ok(captured) if captured.success => info!("store gc finished"),
        Ok(_) => warn!("store gc exited non-zero"),
        Err(e) => error!(error = %e, "store gc failed to start"),
    }
}
