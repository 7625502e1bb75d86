//! Console output
//!
//! Human-readable per-host summary printed once the batch has finished.

use colored::*;
use labscan_core::domain::scan::{EndpointSnapshot, JobStatus};

use crate::scheduler::{BatchReport, HostOutcome};

/// Print one block per host followed by the failure count
pub fn print_report(report: &BatchReport) {
    println!();
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }

    let failed = report.failed();
    if failed == 0 {
        println!(
            "{}",
            format!("Done: {} host(s) assessed", report.outcomes.len()).green()
        );
    } else {
        println!(
            "{}",
            format!("Done: completed with {} failure(s)", failed).yellow()
        );
    }
}

fn print_outcome(outcome: &HostOutcome) {
    match &outcome.result {
        Ok(scan) => {
            let snapshot = &scan.snapshot;
            println!(
                "  {} {} {}",
                "▸".cyan(),
                outcome.hostname.bold(),
                colorize_status(&snapshot.status)
            );
            if let (Some(started), Some(tested)) = (snapshot.started_at(), snapshot.tested_at()) {
                let seconds = tested.signed_duration_since(started).num_seconds();
                println!("    Duration: {}s", seconds);
            }
            for endpoint in &snapshot.endpoints {
                print_endpoint(endpoint);
            }
            println!("    Report:   {}", scan.artifact.display().to_string().dimmed());
        }
        Err(e) => {
            println!("  {} {} {}", "▸".cyan(), outcome.hostname.bold(), "FAILED".red());
            println!("    Error:    {}", e.to_string().red());
        }
    }
    println!();
}

fn print_endpoint(endpoint: &EndpointSnapshot) {
    let grade = if endpoint.grade.is_empty() {
        "-".dimmed()
    } else {
        colorize_grade(&endpoint.grade)
    };
    let warnings = if endpoint.has_warnings {
        " (warnings)".yellow()
    } else {
        "".normal()
    };

    println!(
        "    {:<16} {} {}{}",
        endpoint.ip_address,
        grade,
        endpoint.status_message.dimmed(),
        warnings
    );
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        JobStatus::Ready => status_str.green(),
        JobStatus::InProgress => status_str.cyan(),
        JobStatus::Error | JobStatus::Dns => status_str.red(),
        JobStatus::Other(_) => status_str.yellow(),
    }
}

fn colorize_grade(grade: &str) -> ColoredString {
    match grade.chars().next() {
        Some('A') => grade.green(),
        Some('B') | Some('C') => grade.yellow(),
        _ => grade.red(),
    }
}
