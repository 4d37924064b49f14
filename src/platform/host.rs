//! Host probes that read the local file system

use std::path::Path;

/// Whether the process runs under Windows Subsystem for Linux.
pub fn is_wsl() -> bool {
    std::fs::read_to_string("/proc/version")
        .map(|v| mentions_wsl(&v))
        .unwrap_or(false)
}

/// Whether a `/proc/version` line comes from a WSL kernel.
fn mentions_wsl(version: &str) -> bool {
    let lower = version.to_lowercase();
    lower.contains("microsoft") || lower.contains("wsl")
}

/// Whether systemd is the running init system.
pub fn has_systemd() -> bool {
    Path::new("/run/systemd/system").exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wsl_kernels_are_recognized() {
        assert!(mentions_wsl(
            "Linux version 5.15.153.1-microsoft-standard-WSL2 (root@941d701f84f1)"
        ));
        assert!(mentions_wsl("Linux version 4.4.0-19041-Microsoft"));
        assert!(!mentions_wsl(
            "Linux version 6.8.0-45-generic (buildd@lcy02-amd64-075) #45-Ubuntu SMP"
        ));
    }
}
