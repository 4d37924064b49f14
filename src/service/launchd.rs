//! launchd agents and newsyslog rules

use std::path::Path;

/// newsyslog binary the rotation agent runs
pub const NEWSYSLOG: &str = "/usr/sbin/newsyslog";

/// How often the rotation agent checks the logs
pub const ROTATION_INTERVAL_SECS: u64 = 3600;

/// Rotation policy: mode, retained archives, size threshold in KiB, time trigger, flags
const ROTATION_MODE: &str = "644";
const ROTATION_COUNT: u32 = 7;
const ROTATION_SIZE_KIB: u32 = 10240;
const ROTATION_WHEN: &str = "*";
const ROTATION_FLAGS: &str = "N";

pub struct Agent<'a> {
    pub label: &'a str,
    pub program_arguments: &'a [String],
    /// Restart whenever it exits (and start at load)
    pub keep_alive: bool,
    pub start_interval: Option<u64>,
    pub stdout: Option<&'a Path>,
    pub stderr: Option<&'a Path>,
}

/// Render a launchd property list.
pub fn render_agent(agent: &Agent<'_>) -> String {
    let mut body = Vec::new();
    body.push(key_string("Label", agent.label));

    body.push("    <key>ProgramArguments</key>".to_string());
    body.push("    <array>".to_string());
    for arg in agent.program_arguments {
        body.push(format!("        <string>{}</string>", escape(arg)));
    }
    body.push("    </array>".to_string());

    body.push(key_bool("RunAtLoad", agent.keep_alive));
    if agent.keep_alive {
        body.push(key_bool("KeepAlive", true));
    }
    if let Some(interval) = agent.start_interval {
        body.push("    <key>StartInterval</key>".to_string());
        body.push(format!("    <integer>{interval}</integer>"));
    }
    if let Some(path) = agent.stdout {
        body.push(key_string("StandardOutPath", &path.display().to_string()));
    }
    if let Some(path) = agent.stderr {
        body.push(key_string("StandardErrorPath", &path.display().to_string()));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
{}
</dict>
</plist>
"#,
        body.join("\n")
    )
}

/// Render a newsyslog.conf binding `logs` to the fixed rotation policy.
pub fn render_rotation_rule(logs: &[&Path]) -> String {
    let mut out = String::from("# logfilename\tmode\tcount\tsize\twhen\tflags\n");
    for log in logs {
        out.push_str(&format!(
            "{}\t{ROTATION_MODE}\t{ROTATION_COUNT}\t{ROTATION_SIZE_KIB}\t{ROTATION_WHEN}\t{ROTATION_FLAGS}\n",
            log.display()
        ));
    }
    out
}

fn key_string(key: &str, value: &str) -> String {
    format!("    <key>{key}</key>\n    <string>{}</string>", escape(value))
}

fn key_bool(key: &str, value: bool) -> String {
    format!("    <key>{key}</key>\n    <{value}/>")
}

/// Escape XML text content.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn test_rotation_agent_has_interval_not_keepalive() {
        let args = vec![NEWSYSLOG.to_string(), "-f".to_string(), "/l/n.conf".to_string()];
        let plist = render_agent(&Agent {
            label: "io.pleme.kindling.logrotate",
            program_arguments: &args,
            keep_alive: false,
            start_interval: Some(ROTATION_INTERVAL_SECS),
            stdout: None,
            stderr: None,
        });
        assert!(plist.contains("<key>StartInterval</key>\n    <integer>3600</integer>"));
        assert!(!plist.contains("KeepAlive"));
        assert!(plist.contains("<key>RunAtLoad</key>\n    <false/>"));
    }

    #[test]
    fn test_rotation_rule_line() {
        let rule = render_rotation_rule(&[Path::new("/logs/daemon.out.log")]);
        assert!(rule.ends_with("/logs/daemon.out.log\t644\t7\t10240\t*\tN\n"));
    }
}
