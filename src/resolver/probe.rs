//! Executable probes and the search path

use std::fs;
use std::path::{Path, PathBuf};

/// Answers "is there an executable at this path?"
///
/// The resolver performs every existence check through this trait so tests can
/// count and record probes.
pub trait Probe {
    fn is_executable(&self, path: &Path) -> bool;
}

/// Probes the real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl Probe for FsProbe {
    fn is_executable(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => has_exec_bit(&meta),
            _ => false,
        }
    }
}

#[cfg(unix)]
fn has_exec_bit(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_meta: &fs::Metadata) -> bool {
    true
}

/// Mark a file `0o755`.
#[cfg(unix)]
pub fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
pub fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Ordered list of directories searched for executables
///
/// Owned by the resolver rather than read from the process environment on each
/// lookup; activation prepends to it and child processes receive it as `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    #[cfg(test)]
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Snapshot of the process `PATH`.
    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Put `dir` first unless it is already present. Returns whether it was added.
    pub fn prepend(&mut self, dir: &Path) -> bool {
        if self.dirs.iter().any(|d| d == dir) {
            return false;
        }
        self.dirs.insert(0, dir.to_path_buf());
        true
    }

    /// `PATH`-formatted value for child processes.
    pub fn to_env(&self) -> String {
        std::env::join_paths(&self.dirs)
            .map(|joined| joined.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_probe_requires_exec_bit() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("tool");
        fs::write(&file, "#!/bin/sh\n").unwrap();

        #[cfg(unix)]
        assert!(!FsProbe.is_executable(&file));

        set_executable(&file).unwrap();
        assert!(FsProbe.is_executable(&file));
    }

    #[test]
    fn test_fs_probe_rejects_directories_and_missing() {
        let temp = TempDir::new().unwrap();
        assert!(!FsProbe.is_executable(temp.path()));
        assert!(!FsProbe.is_executable(&temp.path().join("missing")));
    }

    #[test]
    fn test_prepend_is_idempotent() {
        let mut path = SearchPath::new(vec![PathBuf::from("/usr/bin")]);
        assert!(path.prepend(Path::new("/nix/var/nix/profiles/default/bin")));
        assert!(!path.prepend(Path::new("/nix/var/nix/profiles/default/bin")));
        assert!(!path.prepend(Path::new("/usr/bin")));
        assert_eq!(
            path.dirs(),
            [
                PathBuf::from("/nix/var/nix/profiles/default/bin"),
                PathBuf::from("/usr/bin")
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_to_env_joins_with_colon() {
        let path = SearchPath::new(vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(path.to_env(), "/a:/b");
    }
}
