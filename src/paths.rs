//! Per-user paths
//!
//! [`Layout`] is the only process-wide state kindling has: where the config
//! file lives, where downloaded binaries are cached, and where generated shell
//! and supervisor files go. It is built once in `main` and passed explicitly to
//! every component, so tests can root everything under a temporary directory.

use std::path::{Path, PathBuf};

use crate::error::{Result, fs::directory_unavailable};
use crate::platform::OsFamily;

/// Application directory name under config/data roots
const APP_DIR: &str = "kindling";

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Overrides the kindling config directory
pub const CONFIG_DIR_ENV: &str = "KINDLING_CONFIG_DIR";

/// Overrides the kindling data directory (install cache, logs)
pub const DATA_DIR_ENV: &str = "KINDLING_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    home: PathBuf,
    /// XDG-style `~/.config`, used by direnv, tend and systemd
    xdg_config: PathBuf,
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl Layout {
    /// Resolve paths from the platform's standard locations.
    ///
    /// `KINDLING_CONFIG_DIR` and `KINDLING_DATA_DIR` take precedence when set.
    pub fn discover() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| directory_unavailable("home"))?;

        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::config_dir()
                .ok_or_else(|| directory_unavailable("config"))?
                .join(APP_DIR),
        };

        let data_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_local_dir()
                .ok_or_else(|| directory_unavailable("data"))?
                .join(APP_DIR),
        };

        let xdg_config = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"));

        Ok(Self {
            home,
            xdg_config,
            config_dir,
            data_dir,
        })
    }

    /// Root every path under `root`.
    #[cfg(test)]
    pub fn under(root: &Path) -> Self {
        let home = root.join("home");
        Self {
            xdg_config: home.join(".config"),
            config_dir: home.join(".config").join(APP_DIR),
            data_dir: home.join(".local").join("share").join(APP_DIR),
            home,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Per-user directory holding downloaded tool binaries.
    pub fn install_dir(&self) -> PathBuf {
        self.data_dir.join("bin")
    }

    /// Rendered daemon configuration consumed by the supervised daemon.
    pub fn daemon_config_file(&self) -> PathBuf {
        self.config_dir.join("daemon.toml")
    }

    /// This machine's identity, written by the node stage.
    pub fn node_config_file(&self) -> PathBuf {
        self.config_dir.join("node.yaml")
    }

    pub fn direnv_lib_dir(&self) -> PathBuf {
        self.xdg_config.join("direnv").join("lib")
    }

    pub fn tend_config_file(&self) -> PathBuf {
        self.xdg_config.join("tend").join("config.yaml")
    }

    /// Directory the supervisor reads user-level service definitions from.
    pub fn supervisor_dir(&self, family: OsFamily) -> PathBuf {
        match family {
            OsFamily::Apple => self.home.join("Library").join("LaunchAgents"),
            OsFamily::Linux => self.xdg_config.join("systemd").join("user"),
        }
    }

    /// Platform log directory for the daemon.
    pub fn log_dir(&self, family: OsFamily) -> PathBuf {
        match family {
            OsFamily::Apple => self.home.join("Library").join("Logs").join(APP_DIR),
            OsFamily::Linux => self.data_dir.join("logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_under_roots_every_path() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::under(temp.path());

        for path in [
            layout.config_file(),
            layout.install_dir(),
            layout.daemon_config_file(),
            layout.node_config_file(),
            layout.direnv_lib_dir(),
            layout.tend_config_file(),
            layout.supervisor_dir(OsFamily::Apple),
            layout.supervisor_dir(OsFamily::Linux),
            layout.log_dir(OsFamily::Apple),
            layout.log_dir(OsFamily::Linux),
        ] {
            assert!(path.starts_with(temp.path()), "{}", path.display());
        }
    }

    #[test]
    fn test_supervisor_dirs() {
        let layout = Layout::under(Path::new("/r"));
        assert_eq!(
            layout.supervisor_dir(OsFamily::Apple),
            PathBuf::from("/r/home/Library/LaunchAgents")
        );
        assert_eq!(
            layout.supervisor_dir(OsFamily::Linux),
            PathBuf::from("/r/home/.config/systemd/user")
        );
    }

    #[test]
    #[serial]
    fn test_discover_honours_overrides() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("cfg");
        let data = temp.path().join("data");

        unsafe {
            std::env::set_var(CONFIG_DIR_ENV, &config);
            std::env::set_var(DATA_DIR_ENV, &data);
        }

        let layout = Layout::discover().unwrap();

        unsafe {
            std::env::remove_var(CONFIG_DIR_ENV);
            std::env::remove_var(DATA_DIR_ENV);
        }

        assert_eq!(layout.config_file(), config.join("config.toml"));
        assert_eq!(layout.install_dir(), data.join("bin"));
    }
}
