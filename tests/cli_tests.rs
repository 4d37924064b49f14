//! CLI integration tests using the REAL kindling binary

mod common;

use common::{TestHome, kindling_cmd};
use predicates::prelude::*;

#[test]
fn test_help_output() {
    kindling_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bootstrap"))
        .stdout(predicate::str::contains("ensure"))
        .stdout(predicate::str::contains("service"))
        .stdout(predicate::str::contains("daemon"));
}

#[test]
fn test_version_output() {
    kindling_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kindling"))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_completions_bash() {
    kindling_cmd()
        .args(["completions", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kindling"));
}

#[test]
fn test_completions_unknown_shell() {
    kindling_cmd()
        .args(["completions", "--shell", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown shell: tcsh"));
}

#[test]
fn test_unsupported_architecture_fails_before_writing() {
    let home = TestHome::new();
    home.cmd()
        .env("KINDLING_ARCH", "riscv64")
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported platform"))
        .stderr(predicate::str::contains("riscv64"));

    assert!(!home.file_exists("home"));
    assert!(!home.file_exists("config"));
    assert!(!home.file_exists("data"));
}

#[test]
fn test_unsupported_os_fails_bootstrap() {
    let home = TestHome::new();
    home.cmd()
        .env("KINDLING_OS", "windows")
        .args(["bootstrap", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported platform"));

    assert!(!home.file_exists("data"));
}

#[test]
fn test_service_print_linux() {
    let home = TestHome::new();
    home.cmd()
        .args(["service", "print", "--os", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kindling.service"))
        .stdout(predicate::str::contains("ExecStart="))
        .stdout(predicate::str::contains("Restart=on-failure"))
        .stdout(predicate::str::contains("[daemon]"))
        .stdout(predicate::str::contains("LaunchAgents").not());

    // Printing writes nothing.
    assert!(!home.file_exists("home/.config/systemd"));
}

#[test]
fn test_service_print_apple() {
    let home = TestHome::new();
    home.cmd()
        .args(["service", "print", "--os", "apple"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LaunchAgents"))
        .stdout(predicate::str::contains("<key>Label</key>"))
        .stdout(predicate::str::contains("io.pleme.kindling"))
        .stdout(predicate::str::contains("newsyslog"))
        .stdout(predicate::str::contains("ExecStart=").not());
}

#[test]
fn test_service_print_uses_config_file() {
    let home = TestHome::new();
    home.write_file(
        "config/config.toml",
        "[daemon]\nhttp_addr = \"0.0.0.0:9300\"\n",
    );

    home.cmd()
        .args(["service", "print", "--os", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0.0.0:9300"))
        .stdout(predicate::str::contains("127.0.0.1:9101"));
}

#[test]
fn test_service_print_rejects_invalid_daemon_config() {
    let home = TestHome::new();
    home.write_file("config/config.toml", "[daemon]\nlog_level = \"loud\"\n");

    home.cmd()
        .args(["service", "print", "--os", "linux"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("daemon.log_level"));
}

#[test]
fn test_daemon_check_prints_effective_config() {
    let home = TestHome::new();
    let config = home.write_file(
        "daemon.toml",
        "[daemon]\nlog_level = \"warn\"\n\n[daemon.telemetry]\nnode_id = \"studio\"\n",
    );

    home.cmd()
        .args(["daemon", "--check", "--http-addr", "0.0.0.0:9200", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("http_addr = \"0.0.0.0:9200\""))
        .stdout(predicate::str::contains("log_level = \"warn\""))
        .stdout(predicate::str::contains("node_id = \"studio\""));
}

#[test]
fn test_daemon_missing_config_fails() {
    let home = TestHome::new();
    home.cmd()
        .args(["daemon", "--check", "--config"])
        .arg(home.path.join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn test_ensure_rejects_invalid_version() {
    let home = TestHome::new();
    home.cmd()
        .args(["ensure", "--version", "not a version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid version requirement"));
}

#[test]
fn test_install_rejects_unknown_backend() {
    kindling_cmd()
        .args(["install", "--backend", "homebrew"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("homebrew"));
}
