//! Common test utilities for kindling integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated home for kindling invocations
///
/// HOME, the kindling config and data directories and `XDG_CONFIG_HOME` all
/// point inside a temporary directory so tests never touch the real user's files.
pub struct TestHome {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub path: PathBuf,
}

impl TestHome {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file relative to the test home
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// A kindling command bound to this home
    pub fn cmd(&self) -> Command {
        let mut cmd = kindling_cmd();
        cmd.env("HOME", self.path.join("home"))
            .env("KINDLING_CONFIG_DIR", self.path.join("config"))
            .env("KINDLING_DATA_DIR", self.path.join("data"))
            .env("XDG_CONFIG_HOME", self.path.join("home").join(".config"))
            .env_remove("KINDLING_OS")
            .env_remove("KINDLING_ARCH")
            .env_remove("KINDLING_AUTO_INSTALL")
            .env_remove("KINDLING_LOG");
        cmd
    }
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn kindling_cmd() -> Command {
    Command::cargo_bin("kindling").expect("kindling binary")
}
