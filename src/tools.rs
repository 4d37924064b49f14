//! Catalog of the tools kindling manages

use std::path::PathBuf;

use crate::config::Backend;
use crate::paths::Layout;
use crate::resolver::ToolSpec;

/// Default Nix profile bin directory (multi-user installs)
pub const NIX_DEFAULT_PROFILE_BIN: &str = "/nix/var/nix/profiles/default/bin";

/// NixOS system profile bin directory
pub const NIX_SYSTEM_BIN: &str = "/run/current-system/sw/bin";

/// Profile script that puts the Nix daemon environment in place
pub const NIX_DAEMON_PROFILE: &str = "/nix/var/nix/profiles/default/etc/profile.d/nix-daemon.sh";

/// nix-installer keeps a copy of itself here as the install receipt
pub const NIX_INSTALLER_RECEIPT: &str = "/nix/nix-installer";

const UPSTREAM_INSTALLER_URL: &str =
    "https://github.com/NixOS/nix-installer/releases/latest/download/nix-installer-{system}";

const DETERMINATE_INSTALLER_URL: &str =
    "https://install.determinate.systems/nix/nix-installer-{system}";

const KINDLING_RELEASE_URL: &str =
    "https://github.com/pleme-io/kindling/releases/latest/download/{tool}-{target}";

/// Installable passed to `nix profile install` for direnv
pub const DIRENV_INSTALLABLE: &str = "nixpkgs#direnv";

/// Installable passed to `nix profile install` for tend
pub const TEND_INSTALLABLE: &str = "github:pleme-io/tend";

/// Tool specs rooted at one [`Layout`]
#[derive(Debug, Clone)]
pub struct Catalog {
    home: PathBuf,
    install_dir: PathBuf,
}

impl Catalog {
    pub fn new(layout: &Layout) -> Self {
        Self {
            home: layout.home().to_path_buf(),
            install_dir: layout.install_dir(),
        }
    }

    /// Bin directories a `nix profile install` makes tools appear in.
    pub fn profile_bin_dirs(&self) -> [PathBuf; 2] {
        [
            PathBuf::from(NIX_DEFAULT_PROFILE_BIN),
            self.home.join(".nix-profile").join("bin"),
        ]
    }

    /// Spec with candidates in every Nix profile location.
    fn profile_tool(&self, name: &str) -> ToolSpec {
        ToolSpec::new(name, &self.install_dir)
            .candidate(PathBuf::from(NIX_DEFAULT_PROFILE_BIN).join(name))
            .candidate(PathBuf::from(NIX_SYSTEM_BIN).join(name))
            .candidate(self.home.join(".nix-profile").join("bin").join(name))
    }

    pub fn nix(&self) -> ToolSpec {
        self.profile_tool("nix").activation(NIX_DAEMON_PROFILE)
    }

    pub fn nix_installer(&self, backend: Backend) -> ToolSpec {
        let url = match backend {
            Backend::Upstream => UPSTREAM_INSTALLER_URL,
            Backend::Determinate => DETERMINATE_INSTALLER_URL,
        };
        ToolSpec::new("nix-installer", &self.install_dir)
            .candidate(NIX_INSTALLER_RECEIPT)
            .candidate(PathBuf::from(NIX_DEFAULT_PROFILE_BIN).join("nix-installer"))
            .download(url)
            .cache_as(format!("nix-installer-{backend}"))
    }

    pub fn direnv(&self) -> ToolSpec {
        self.profile_tool("direnv")
    }

    pub fn tend(&self) -> ToolSpec {
        self.profile_tool("tend")
    }

    /// kindling itself, as used by the shell hook and the daemon stage
    pub fn kindling(&self) -> ToolSpec {
        ToolSpec::new("kindling", &self.install_dir)
            .candidate(self.home.join(".local").join("bin").join("kindling"))
            .candidate(self.home.join(".cargo").join("bin").join("kindling"))
            .candidate(PathBuf::from(NIX_DEFAULT_PROFILE_BIN).join("kindling"))
            .candidate(self.home.join(".nix-profile").join("bin").join("kindling"))
            .download(KINDLING_RELEASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::detect;
    use std::path::Path;

    #[test]
    fn test_nix_candidates_in_order() {
        let catalog = Catalog::new(&Layout::under(Path::new("/r")));
        let nix = catalog.nix();
        assert_eq!(
            nix.candidates,
            [
                PathBuf::from("/nix/var/nix/profiles/default/bin/nix"),
                PathBuf::from("/run/current-system/sw/bin/nix"),
                PathBuf::from("/r/home/.nix-profile/bin/nix"),
            ]
        );
        assert!(nix.download.is_none());
        assert_eq!(nix.activation, Some(PathBuf::from(NIX_DAEMON_PROFILE)));
    }

    #[test]
    fn test_installer_url_follows_backend() {
        let catalog = Catalog::new(&Layout::under(Path::new("/r")));
        let target = detect("macos", "arm64").unwrap();

        assert_eq!(
            catalog
                .nix_installer(Backend::Upstream)
                .download_url(&target)
                .unwrap(),
            "https://github.com/NixOS/nix-installer/releases/latest/download/nix-installer-aarch64-darwin"
        );
        assert_eq!(
            catalog
                .nix_installer(Backend::Determinate)
                .download_url(&target)
                .unwrap(),
            "https://install.determinate.systems/nix/nix-installer-aarch64-darwin"
        );
    }

    #[test]
    fn test_installer_cache_is_per_backend() {
        let layout = Layout::under(Path::new("/r"));
        let catalog = Catalog::new(&layout);

        let upstream = catalog.nix_installer(Backend::Upstream);
        let determinate = catalog.nix_installer(Backend::Determinate);
        assert_eq!(upstream.name, determinate.name);
        assert_eq!(
            upstream.cached_path(),
            layout.install_dir().join("nix-installer-upstream")
        );
        assert_eq!(
            determinate.cached_path(),
            layout.install_dir().join("nix-installer-determinate")
        );
    }

    #[test]
    fn test_kindling_release_url() {
        let layout = Layout::under(Path::new("/r"));
        let kindling = Catalog::new(&layout).kindling();
        let target = detect("linux", "amd64").unwrap();

        assert_eq!(
            kindling.download_url(&target).unwrap(),
            "https://github.com/pleme-io/kindling/releases/latest/download/kindling-x86_64-unknown-linux-musl"
        );
        assert_eq!(kindling.cached_path(), layout.install_dir().join("kindling"));
    }
}
