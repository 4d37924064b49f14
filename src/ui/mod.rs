//! Terminal presentation layer
//!
//! This module handles:
//! - Step markers for user-facing progress (`>>`, `::`, `ok`, `!!`)
//! - Stage progress during bootstrap via the [`StageReporter`] trait
//! - Summaries and tables (see [`display`])
//!
//! Diagnostics go through `tracing` to stderr; everything here is stdout.

pub mod display;

use console::Style;

use crate::stages::StageRecord;

/// Header for a unit of work
pub fn step(msg: impl std::fmt::Display) {
    println!("{} {msg}", Style::new().cyan().bold().apply_to(">>"));
}

/// Informational line
pub fn info(msg: impl std::fmt::Display) {
    println!("{} {msg}", Style::new().blue().bold().apply_to("::"));
}

/// Success line
pub fn ok(msg: impl std::fmt::Display) {
    println!("{} {msg}", Style::new().green().bold().apply_to("ok"));
}

/// Warning line
pub fn warn(msg: impl std::fmt::Display) {
    println!("{} {msg}", Style::new().yellow().bold().apply_to("!!"));
}

/// Receives stage transitions from the orchestrator
///
/// Allows different strategies:
/// - Console output with markers (default)
/// - Silent, for tests
pub trait StageReporter {
    fn started(&mut self, position: usize, total: usize, name: &str);

    fn finished(&mut self, record: &StageRecord);
}

/// Prints stage transitions with step markers
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl StageReporter for ConsoleReporter {
    fn started(&mut self, position: usize, total: usize, name: &str) {
        step(format!("[{position}/{total}] {name}"));
    }

    fn finished(&mut self, record: &StageRecord) {
        display::display_record(record);
    }
}

/// No-op reporter
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SilentReporter;

#[cfg(test)]
impl StageReporter for SilentReporter {
    fn started(&mut self, _position: usize, _total: usize, _name: &str) {}

    fn finished(&mut self, _record: &StageRecord) {}
}
