//! Human-readable console lines: progress on stdout, failures on stderr.

use hubfetch_core::pipeline::{FetchEvent, PlannedResource};
use hubfetch_core::report::{Outcome, ResourceKind, RunReport};
use std::path::Path;

pub fn print_banner(root: &Path) {
    println!("Fetching models into {}", root.display());
}

pub fn print_event(event: FetchEvent<'_>) {
    match event {
        FetchEvent::Started(item) => match item.kind {
            ResourceKind::Repository => println!("\nCloning {} from {}...", item.name, item.source),
            ResourceKind::Asset => println!("\nDownloading {}...", item.name),
        },
        FetchEvent::Finished(report) => {
            if let Some(line) = outcome_line(&report.name, &report.outcome) {
                println!("{}", line);
            } else if let Outcome::Failed { cause } = &report.outcome {
                eprintln!("\nFailed to fetch {}: {}", report.name, cause);
            }
        }
    }
}

/// Success line for an outcome, or None for failures.
pub(crate) fn outcome_line(name: &str, outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Cloned => Some(format!("Successfully cloned {}", name)),
        Outcome::Downloaded { bytes, redirects: 0 } => {
            Some(format!("Successfully downloaded {} ({} bytes)", name, bytes))
        }
        Outcome::Downloaded { bytes, redirects } => Some(format!(
            "Successfully downloaded {} ({} bytes, {} redirect(s))",
            name, bytes, redirects
        )),
        Outcome::Failed { .. } => None,
    }
}

pub fn print_summary(report: &RunReport) {
    let failed = report.failure_count();
    if failed == 0 {
        println!("\nModel download process finished.");
    } else {
        println!(
            "\nModel download process finished: {} of {} resources failed.",
            failed,
            report.resources.len()
        );
    }
}

pub fn print_plan(plan: &[PlannedResource]) {
    for item in plan {
        println!("{:<10} {} <- {}", item.kind, item.target.display(), item.source);
    }
}
