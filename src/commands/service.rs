//! Service command implementation

use std::path::PathBuf;

use crate::cli::ServiceCommand;
use crate::consent;
use crate::error::Result;
use crate::platform::OsFamily;
use crate::service::{self, CompiledService, DaemonSpec};
use crate::tools::Catalog;
use crate::ui::{self, display::display_field};

use super::helpers::Session;

/// Run service command
pub fn run(command: ServiceCommand) -> Result<()> {
    match command {
        ServiceCommand::Print { os } => print(os),
        ServiceCommand::Install { no_confirm } => install(no_confirm),
    }
}

fn compile_for(session: &Session, family: OsFamily, binary: PathBuf) -> Result<CompiledService> {
    let config = session.config.daemon_or_default();
    config.validate()?;
    let spec = DaemonSpec::for_layout(&session.layout, family, binary, config);
    service::compile(&spec, family)
}

fn print(os: Option<OsFamily>) -> Result<()> {
    let session = Session::open()?;
    let family = os.unwrap_or_else(|| session.target.family());
    let kindling = Catalog::new(&session.layout).kindling();
    // Printing never downloads; show the cache path when kindling is not found.
    let binary = session
        .resolver()?
        .locate(&kindling)
        .map_or_else(|| kindling.cached_path(), |found| found.path);
    let compiled = compile_for(&session, family, binary)?;

    for file in compiled.files() {
        println!("# {}", file.path.display());
        print!("{}", file.contents);
        println!();
    }
    Ok(())
}

fn install(no_confirm: bool) -> Result<()> {
    let session = Session::open()?;
    let family = session.target.family();
    let kindling = session
        .resolver()?
        .resolve(&Catalog::new(&session.layout).kindling(), &session.target)?;
    let compiled = compile_for(&session, family, kindling.path)?;

    if !compiled.primary().path.exists()
        && !consent::for_flags(no_confirm).confirm("Install the kindling daemon service")?
    {
        return Err(crate::error::KindlingError::ConsentDenied {
            action: "Install the kindling daemon service".to_string(),
        });
    }

    let summary = service::install(&compiled, &session.runner)?;
    for path in &summary.written {
        display_field("wrote", path.display());
    }
    for path in &summary.unchanged {
        display_field("unchanged", path.display());
    }
    if summary.reloaded {
        ui::ok(format!("Reloaded {family} service"));
    } else {
        ui::ok("Service already up to date");
    }
    Ok(())
}
