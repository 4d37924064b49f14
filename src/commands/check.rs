//! Check command implementation

use serde::Serialize;

use crate::cli::{CheckArgs, OutputFormat};
use crate::consent::AssumeYes;
use crate::error::{KindlingError, Result};
use crate::platform::{Target, host};
use crate::stages::{StageContext, nix};
use crate::ui::{self, display::display_field};

use super::helpers::Session;

#[derive(Debug, Serialize)]
struct CheckReport {
    target: String,
    wsl: bool,
    nix: nix::NixStatus,
}

/// Run check command
pub fn run(args: CheckArgs) -> Result<()> {
    let session = Session::open()?;
    let mut resolver = session.resolver()?;
    let ctx = StageContext::new(
        &session.layout,
        session.target,
        &mut resolver,
        &session.runner,
        &AssumeYes,
        &session.config,
    );

    let report = CheckReport {
        target: session.target.to_string(),
        wsl: host::is_wsl(),
        nix: nix::status(&ctx)?,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_table(&session.target, &report),
    }

    if report.nix.installed {
        Ok(())
    } else {
        Err(KindlingError::NixNotInstalled)
    }
}

fn print_table(target: &Target, report: &CheckReport) {
    ui::step("kindling check");
    let wsl = if report.wsl { " (WSL)" } else { "" };
    display_field("platform", format!("{target}{wsl}"));
    if report.nix.installed {
        display_field("nix", console::style("installed").green());
        if let Some(version) = &report.nix.version {
            display_field("version", version);
        }
        if let Some(path) = &report.nix.path {
            display_field("path", path.display());
        }
    } else {
        display_field("nix", console::style("not installed").red());
        display_field("hint", "run `kindling install` to install Nix");
    }
}
