use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::config::TelemetryConfig;
use crate::runner::testing::RecordingRunner;

fn spec_under(root: &Path, family: OsFamily) -> DaemonSpec {
    let layout = Layout::under(root);
    DaemonSpec::for_layout(
        &layout,
        family,
        root.join("bin").join("kindling"),
        DaemonConfig::default(),
    )
}

#[test]
fn test_compile_is_deterministic() {
    for family in [OsFamily::Apple, OsFamily::Linux] {
        let spec = spec_under(Path::new("/r"), family);
        let first = compile(&spec, family).unwrap();
        let second = compile(&spec.clone(), family).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_rendered_config_fills_defaults() {
    let config = DaemonConfig {
        http_addr: "127.0.0.1:9100".to_string(),
        log_level: "info".to_string(),
        telemetry: TelemetryConfig {
            enabled: false,
            ..TelemetryConfig::default()
        },
        ..DaemonConfig::default()
    };
    let spec = DaemonSpec {
        config,
        ..spec_under(Path::new("/r"), OsFamily::Linux)
    };

    let rendered = compile(&spec, OsFamily::Linux).unwrap().config_file.contents;
    assert!(rendered.contains("[daemon]"));
    assert!(rendered.contains(r#"http_addr = "127.0.0.1:9100""#));
    assert!(rendered.contains(r#"log_level = "info""#));
    assert!(rendered.contains("[daemon.telemetry]"));
    assert!(rendered.contains("enabled = false"));
    assert!(rendered.contains(r#"endpoint_url = "http://localhost:8686""#));
    assert!(rendered.contains("schedule_secs = 0"));

    let parsed: toml::Value = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed["daemon"]["grpc_addr"].as_str(), Some("127.0.0.1:9101"));
}

#[test]
fn test_apple_emits_agent_and_rotation_only() {
    let spec = spec_under(Path::new("/r"), OsFamily::Apple);
    let compiled = compile(&spec, OsFamily::Apple).unwrap();

    let SupervisorArtifact::AppleAgent(apple) = &compiled.supervisor else {
        panic!("expected a launchd agent");
    };
    assert_eq!(
        apple.agent.path,
        Path::new("/r/home/Library/LaunchAgents/io.pleme.kindling.plist")
    );
    assert_eq!(
        apple.rotation.schedule.path,
        Path::new("/r/home/Library/LaunchAgents/io.pleme.kindling.logrotate.plist")
    );

    let log_dir = Path::new("/r/home/Library/Logs/kindling");
    let out_log = log_dir.join(STDOUT_LOG).display().to_string();
    let err_log = log_dir.join(STDERR_LOG).display().to_string();

    let agent = &apple.agent.contents;
    assert!(agent.contains("<string>io.pleme.kindling</string>"));
    assert!(agent.contains("<string>/r/bin/kindling</string>"));
    assert!(agent.contains("<string>daemon</string>"));
    assert!(agent.contains("<key>RunAtLoad</key>\n    <true/>"));
    assert!(agent.contains("<key>KeepAlive</key>\n    <true/>"));
    assert!(agent.contains(&format!("<string>{out_log}</string>")));
    assert!(agent.contains(&format!("<string>{err_log}</string>")));

    let rule = &apple.rotation.rule.contents;
    assert!(rule.contains(&format!("{out_log}\t644\t7\t10240\t*\tN")));
    assert!(rule.contains(&format!("{err_log}\t644\t7\t10240\t*\tN")));
    assert!(
        apple
            .rotation
            .schedule
            .contents
            .contains("<string>/usr/sbin/newsyslog</string>")
    );

    for file in compiled.files() {
        assert!(!file.contents.contains("[Service]"));
        assert!(!file.path.to_string_lossy().ends_with(".service"));
    }
}

#[test]
fn test_linux_emits_unit_without_rotation() {
    let spec = spec_under(Path::new("/r"), OsFamily::Linux);
    let compiled = compile(&spec, OsFamily::Linux).unwrap();

    let SupervisorArtifact::LinuxUnit(linux) = &compiled.supervisor else {
        panic!("expected a systemd unit");
    };
    assert_eq!(
        linux.unit.path,
        Path::new("/r/home/.config/systemd/user/kindling.service")
    );
    assert_eq!(linux.unit_name, "kindling.service");

    let unit = &linux.unit.contents;
    assert!(unit.contains("Description=kindling node daemon"));
    assert!(unit.contains(
        "ExecStart=/r/bin/kindling daemon --config /r/home/.config/kindling/daemon.toml"
    ));
    assert!(unit.contains("Restart=on-failure"));
    assert!(unit.contains("WantedBy=default.target"));

    assert_eq!(compiled.files().len(), 2);
    for file in compiled.files() {
        assert!(!file.contents.contains("<plist"));
        assert!(!file.contents.contains("newsyslog"));
    }
}

#[test]
fn test_special_characters_are_escaped() {
    let root = Path::new("/r/A&B <dev>");
    let apple = compile(&spec_under(root, OsFamily::Apple), OsFamily::Apple).unwrap();
    assert!(apple.primary().contents.contains("/r/A&amp;B &lt;dev&gt;/bin/kindling"));

    let linux = compile(&spec_under(root, OsFamily::Linux), OsFamily::Linux).unwrap();
    assert!(
        linux
            .primary()
            .contents
            .contains("ExecStart=\"/r/A&B <dev>/bin/kindling\" daemon")
    );
}

#[test]
fn test_install_writes_then_is_noop() {
    let temp = TempDir::new().unwrap();
    let spec = spec_under(temp.path(), OsFamily::Linux);
    let compiled = compile(&spec, OsFamily::Linux).unwrap();

    let runner = RecordingRunner::new();
    let first = install(&compiled, &runner).unwrap();
    assert_eq!(first.written.len(), 2);
    assert!(first.reloaded);
    assert_eq!(
        runner.command_lines(),
        [
            "systemctl --user daemon-reload",
            "systemctl --user enable --now kindling.service"
        ]
    );

    let second = install(&compiled, &runner).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 2);
    assert!(!second.reloaded);
    assert_eq!(runner.calls().len(), 2);
}

#[test]
fn test_install_apple_reloads_both_agents() {
    let temp = TempDir::new().unwrap();
    let spec = spec_under(temp.path(), OsFamily::Apple);
    let compiled = compile(&spec, OsFamily::Apple).unwrap();

    let runner = RecordingRunner::new();
    let summary = install(&compiled, &runner).unwrap();
    assert_eq!(summary.written.len(), 4);
    assert!(spec.log_dir.is_dir());

    let lines = runner.command_lines();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("launchctl unload "));
    assert!(lines[1].starts_with("launchctl load -w "));
    assert!(lines[3].ends_with("io.pleme.kindling.logrotate.plist"));
}

#[cfg(unix)]
#[test]
fn test_config_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let compiled = compile(&spec_under(temp.path(), OsFamily::Linux), OsFamily::Linux).unwrap();
    install(&compiled, &RecordingRunner::new()).unwrap();

    let mode = std::fs::metadata(&compiled.config_file.path)
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
