//! Hook command implementation

use crate::error::Result;
use crate::shell::ShellHook;
use crate::tools::Catalog;

use super::helpers::Session;

/// Run hook command: print shell lines for `eval "$(kindling hook)"`.
pub fn run() -> Result<()> {
    let session = Session::open()?;
    let mut resolver = session.resolver()?;
    let catalog = Catalog::new(&session.layout);

    let hook = ShellHook::new(catalog.nix(), catalog.kindling());
    let report = hook.run(&mut resolver, &session.target, &session.runner)?;
    print!("{}", report.to_shell());
    Ok(())
}
