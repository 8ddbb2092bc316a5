// Colored terminal output for run summaries and dry-run previews.
//
// This module handles all terminal-specific formatting. The main.rs
// command handlers delegate here.

use colored::Colorize;

use crate::model::{ActivityData, Fragment, Snapshot};
use crate::pipeline::RunSummary;

/// Display the outcome of a run.
pub fn display_run_summary(summary: &RunSummary, dry_run: bool) {
    let title = if dry_run {
        "=== Dry Run Complete ==="
    } else {
        "=== Run Complete ==="
    };
    println!("\n{}", title.bold());
    println!();
    println!(
        "  Groups listed:     {} ({} open community groups)",
        summary.groups_listed, summary.groups_monitored
    );

    let verb = if dry_run { "collected" } else { "saved" };
    println!(
        "  Snapshots {verb}:  {}",
        summary.snapshots_saved.to_string().green()
    );
    if summary.snapshots_failed > 0 {
        println!(
            "  {} {} snapshots could not be saved",
            "!!".red().bold(),
            summary.snapshots_failed
        );
    }
    if summary.snapshots_degraded > 0 {
        println!(
            "  {} {} snapshots have failed branches or services (see logs)",
            "~".yellow(),
            summary.snapshots_degraded
        );
    }
    println!();
}

/// One line per snapshot: group, services collected, and which branches failed.
pub fn display_snapshot_table(snapshots: &[Snapshot]) {
    if snapshots.is_empty() {
        println!("No open community groups found.");
        return;
    }

    println!(
        "  {:>6}  {:<40} {:>8}  {:<10}",
        "Id".dimmed(),
        "Group".dimmed(),
        "Services".dimmed(),
        "Status".dimmed(),
    );
    println!("  {}", "-".repeat(70).dimmed());

    for snapshot in snapshots {
        let services = match &snapshot.activities {
            Fragment::Loaded(records) => records.len().to_string(),
            Fragment::Failed(_) => "-".to_string(),
        };
        println!(
            "  {:>6}  {:<40} {:>8}  {}",
            snapshot.id,
            super::truncate_chars(&snapshot.group.name, 37),
            services,
            describe_status(snapshot),
        );
    }
    println!();
}

fn describe_status(snapshot: &Snapshot) -> colored::ColoredString {
    let mut failed = Vec::new();
    if snapshot.chairs.is_failed() {
        failed.push("chairs");
    }
    if snapshot.participations.is_failed() {
        failed.push("participations");
    }
    match &snapshot.activities {
        Fragment::Failed(_) => failed.push("services"),
        Fragment::Loaded(records) => {
            if records.iter().any(|r| matches!(r.data, ActivityData::Error(_))) {
                failed.push("some services");
            }
        }
    }

    if failed.is_empty() {
        "ok".green()
    } else {
        format!("failed: {}", failed.join(", ")).yellow()
    }
}
