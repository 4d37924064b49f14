//! External command execution
//!
//! Installers, `nix profile`, `tend sync` and the supervisors are invoked, never
//! reimplemented. Everything goes through [`CommandRunner`] so stages can be
//! exercised against a recording double.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Result, resolve::command_failed};

/// A command to execute: program, arguments and extra environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    #[cfg(test)]
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    #[cfg(test)]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[cfg(test)]
    pub fn get_env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Program file name for messages
    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// Captured result of a command whose output is needed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub success: bool,
    pub stdout: String,
}

pub trait CommandRunner {
    /// Run with inherited stdio; returns whether the command exited successfully.
    fn run(&self, invocation: &Invocation) -> Result<bool>;

    /// Run capturing stdout.
    fn capture(&self, invocation: &Invocation) -> Result<Captured>;

    /// Run and turn a non-zero exit into [`crate::error::KindlingError::CommandFailed`].
    fn run_checked(&self, invocation: &Invocation) -> Result<()> {
        if self.run(invocation)? {
            Ok(())
        } else {
            Err(command_failed(
                invocation.display_name(),
                "exited with a non-zero status",
            ))
        }
    }
}

/// Runs commands with `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        for (key, value) in &invocation.env {
            command.env(key, value);
        }
        command
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<bool> {
        debug!(program = %invocation.program.display(), args = ?invocation.args, "running");
        let status = Self::command(invocation)
            .status()
            .map_err(|e| command_failed(invocation.display_name(), e.to_string()))?;
        Ok(status.success())
    }

    fn capture(&self, invocation: &Invocation) -> Result<Captured> {
        debug!(program = %invocation.program.display(), args = ?invocation.args, "capturing");
        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| command_failed(invocation.display_name(), e.to_string()))?;
        Ok(Captured {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use testing::RecordingRunner;

    #[test]
    fn test_invocation_builder() {
        let invocation = Invocation::new("/nix/nix-installer")
            .arg("install")
            .args(["--no-confirm", "--init", "none"])
            .env("PATH", "/usr/bin");

        assert_eq!(invocation.display_name(), "nix-installer");
        assert_eq!(
            invocation.get_args(),
            ["install", "--no-confirm", "--init", "none"]
        );
        assert_eq!(invocation.get_env(), [("PATH".to_string(), "/usr/bin".to_string())]);
    }

    #[test]
    fn test_run_checked_maps_failure() {
        let runner = RecordingRunner::new().failing("tend");
        let err = runner
            .run_checked(&Invocation::new("/bin/tend").arg("sync"))
            .unwrap_err();
        assert!(err.to_string().contains("tend"));
        assert_eq!(runner.command_lines(), ["tend sync"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_stdout() {
        let captured = SystemRunner
            .capture(&Invocation::new("/bin/sh").args(["-c", "echo nix (Nix) 2.24.12"]))
            .unwrap();
        assert!(captured.success);
        assert_eq!(captured.stdout.trim(), "nix (Nix) 2.24.12");
    }

    #[test]
    fn test_system_runner_reports_missing_program() {
        let err = SystemRunner
            .run(&Invocation::new("/definitely/not/a/program"))
            .unwrap_err();
        assert!(err.to_string().contains("program"));
    }
}
