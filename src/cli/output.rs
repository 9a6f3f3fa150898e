//! Status lines for the terminal. Everything goes to stderr: stdout carries
//! only the results file path.

use crate::core::pipeline::RunSummary;
use colored::*;

pub fn section_header(title: &str) {
    eprintln!("\n{}", title.bold().cyan());
    eprintln!("{}", "─".repeat(title.chars().count()).dimmed());
}

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

pub fn tree_item(is_last: bool, label: &str, value: Option<&str>) {
    let prefix = if is_last { "└─" } else { "├─" };
    if let Some(val) = value {
        eprintln!("{} {}: {}", prefix.dimmed(), label, val);
    } else {
        eprintln!("{} {}", prefix.dimmed(), label);
    }
}

pub fn run_summary(summary: &RunSummary, rows: usize) {
    section_header("BLAST Screening Summary");
    tree_item(false, "Chunks", Some(&summary.total.to_string()));
    tree_item(false, "Completed", Some(&summary.completed.to_string()));
    let skipped = if summary.skipped > 0 {
        summary.skipped.to_string().yellow().to_string()
    } else {
        summary.skipped.to_string()
    };
    tree_item(false, "Skipped", Some(&skipped));
    tree_item(false, "With matches", Some(&summary.matches.to_string()));
    tree_item(true, "Rows written", Some(&rows.to_string()));

    if summary.skipped == 0 {
        success("All chunks resolved");
    }
}
