//! Display functions for reports and status

use console::Style;

use crate::stages::{BootstrapReport, StageRecord, StageStatus};

/// Print one stage's outcome as it completes.
pub fn display_record(record: &StageRecord) {
    match &record.status {
        StageStatus::Completed { actions } if actions.is_empty() => {
            super::ok(format!("{} already set up", record.name));
        }
        StageStatus::Completed { actions } => {
            for action in actions {
                super::ok(action);
            }
        }
        StageStatus::Skipped => super::info(format!("{} skipped", record.name)),
        StageStatus::FailedContinued { error } => {
            super::warn(format!("{} failed: {error}", record.name));
        }
    }
}

/// Print the end-of-run summary.
pub fn display_report(report: &BootstrapReport) {
    println!();
    println!("{}", Style::new().bold().apply_to("Summary"));
    for record in &report.records {
        let (marker, detail) = match &record.status {
            StageStatus::Completed { actions } if actions.is_empty() => {
                (Style::new().green().apply_to("ok"), "unchanged".to_string())
            }
            StageStatus::Completed { actions } => (
                Style::new().green().apply_to("ok"),
                format!("{} change(s)", actions.len()),
            ),
            StageStatus::Skipped => (Style::new().dim().apply_to("--"), "skipped".to_string()),
            StageStatus::FailedContinued { error } => {
                (Style::new().yellow().apply_to("!!"), error.clone())
            }
        };
        println!("  {marker} {:<8} {detail}", record.name);
    }
    println!();
}

/// Print `label: value` with a bold label, for status tables.
pub fn display_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<14} {value}", Style::new().bold().apply_to(format!("{label}:")));
}
