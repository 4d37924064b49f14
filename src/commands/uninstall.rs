//! Uninstall command implementation

use std::path::PathBuf;

use crate::config::Backend;
use crate::error::{KindlingError, Result, fs::write_failed};
use crate::resolver::{FsProbe, Probe};
use crate::runner::{CommandRunner, Invocation};
use crate::tools::{Catalog, NIX_DEFAULT_PROFILE_BIN, NIX_INSTALLER_RECEIPT};
use crate::ui;

use super::helpers::Session;

/// Where nix-installer leaves a copy of itself after installing
pub fn receipt_locations() -> [PathBuf; 2] {
    [
        PathBuf::from(NIX_INSTALLER_RECEIPT),
        PathBuf::from(NIX_DEFAULT_PROFILE_BIN).join("nix-installer"),
    ]
}

/// First receipt the probe accepts.
pub fn find_receipt(probe: &dyn Probe) -> Result<PathBuf> {
    let locations = receipt_locations();
    locations
        .iter()
        .find(|path| probe.is_executable(path))
        .cloned()
        .ok_or_else(|| KindlingError::InstallerNotFound {
            searched: locations
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" or "),
        })
}

/// Delete every backend's cached installer, returning the paths removed.
pub fn remove_cached_installers(catalog: &Catalog) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for backend in Backend::ALL {
        let cached = catalog.nix_installer(backend).cached_path();
        if cached.exists() {
            std::fs::remove_file(&cached).map_err(|e| write_failed(&cached, e))?;
            removed.push(cached);
        }
    }
    Ok(removed)
}

/// Run uninstall command
pub fn run() -> Result<()> {
    let session = Session::open()?;
    let installer = find_receipt(&FsProbe)?;

    ui::info("Running nix-installer uninstall");
    session
        .runner
        .run_checked(&Invocation::new(&installer).args(["uninstall", "--no-confirm"]))?;

    remove_cached_installers(&Catalog::new(&session.layout))?;

    ui::ok("Nix uninstalled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::Layout;
    use crate::resolver::testing::SharedProbe;
    use tempfile::TempDir;

    #[test]
    fn test_prefers_top_level_receipt() {
        let probe = SharedProbe::default();
        probe.add(NIX_INSTALLER_RECEIPT);
        probe.add(PathBuf::from(NIX_DEFAULT_PROFILE_BIN).join("nix-installer"));
        assert_eq!(find_receipt(&probe).unwrap(), PathBuf::from(NIX_INSTALLER_RECEIPT));
    }

    #[test]
    fn test_missing_receipt_lists_locations() {
        let err = find_receipt(&SharedProbe::default()).unwrap_err();
        assert!(matches!(err, KindlingError::InstallerNotFound { .. }));
        assert!(err.to_string().contains("/nix/nix-installer or "));
    }

    #[test]
    fn test_removes_cached_installers_for_both_backends() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::under(temp.path());
        let catalog = Catalog::new(&layout);
        std::fs::create_dir_all(layout.install_dir()).unwrap();
        for backend in Backend::ALL {
            std::fs::write(catalog.nix_installer(backend).cached_path(), "bin").unwrap();
        }
        let kept = layout.install_dir().join("kindling");
        std::fs::write(&kept, "bin").unwrap();

        let removed = remove_cached_installers(&catalog).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|path| !path.exists()));
        assert!(kept.exists());
        assert!(remove_cached_installers(&catalog).unwrap().is_empty());
    }
}
