//! Install command implementation

use crate::cli::InstallArgs;
use crate::consent;
use crate::error::Result;
use crate::stages::{StageContext, nix};
use crate::ui;

use super::helpers::{Session, wsl_without_systemd};

/// Run install command
pub fn run(args: InstallArgs) -> Result<()> {
    let session = Session::open()?;
    let backend = args.backend.unwrap_or_else(|| session.config.backend());
    let mut resolver = session.resolver()?;
    let consent = consent::for_flags(args.no_confirm);

    let mut ctx = StageContext::new(
        &session.layout,
        session.target,
        &mut resolver,
        &session.runner,
        consent.as_ref(),
        &session.config,
    );
    ctx.no_confirm = args.no_confirm;
    ctx.wsl_without_systemd = wsl_without_systemd();

    if let Some(found) = ctx.resolver.locate(&ctx.catalog.nix()) {
        ui::ok(format!("Nix already installed at {}", found.path.display()));
        return Ok(());
    }

    ui::info(format!("Installing Nix ({backend} backend)"));
    nix::install(&mut ctx, backend)?;

    let status = nix::status(&ctx)?;
    match status.version {
        Some(version) => ui::ok(format!("Nix {version} installed")),
        None => ui::ok("Nix installed"),
    }
    ui::info("Open a new shell, or source the Nix profile, to use it");
    Ok(())
}
