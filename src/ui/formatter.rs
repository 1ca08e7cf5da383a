//! Pure formatting functions for terminal output.

use crate::release::{GitFlowPlan, ReleaseOutcome};
use crate::tracker::SyncOutcome;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Summarize a finished release: version, branches touched and tag.
pub fn display_release_outcome(outcome: &ReleaseOutcome) {
    println!("\n{}", style("Release summary:").bold());
    match &outcome.version {
        Some(version) => println!("  Version: {}", style(version).green()),
        None => println!("  Version: {}", style("unversioned").dim()),
    }
    match &outcome.plan {
        GitFlowPlan::InPlace { branch } => println!("  Branch:  {}", branch),
        GitFlowPlan::GitFlow { development, main } => {
            println!("  Branch:  {} merged into {}", development, main)
        }
    }
    if let Some(tag) = &outcome.tag {
        println!("  Tag:     {}", style(tag).cyan());
    }
    println!("  Steps:   {}", outcome.steps.len());
}

/// One line per ticket referenced by a webhook event.
pub fn display_sync_outcomes(outcomes: &[SyncOutcome]) {
    if outcomes.is_empty() {
        display_status("No tagged ticket in this event");
        return;
    }

    for outcome in outcomes {
        let mark = if outcome.advanced {
            style("✓").green()
        } else {
            style("·").dim()
        };
        println!("  {} {} → {}", mark, outcome.ticket, outcome.target);
    }
}
