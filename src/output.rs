use chrono::NaiveDate;

use crate::models::{CreatedTimeEntry, NewTimeEntry, TimeEntry};
use crate::pipeline::RunSummary;

pub fn format_day_listing(date: NaiveDate, entries: &[TimeEntry]) -> String {
    let mut output = format!("----- {} -----\n", date.format("%Y-%m-%d"));
    if entries.is_empty() {
        output.push_str("No entries\n");
    }
    for entry in entries {
        output.push_str(&format!("{} : {}\n", entry.project, entry.task));
        output.push_str(&format!("\tHours: {}\n", entry.hours));
        output.push_str(&format!("\tNotes: {}\n", entry.notes));
    }
    output.push('\n');
    output
}

pub fn format_dry_run(date: NaiveDate, payload: &NewTimeEntry) -> String {
    let json = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|err| format!("<unserializable: {err}>"));
    format!("[dry-run] {} would submit:\n{}\n", date.format("%Y-%m-%d"), json)
}

pub fn format_created(created: &CreatedTimeEntry) -> String {
    let mut output = format!("Created time entry {}", created.id);
    if let Some(description) = created.description.as_deref().filter(|d| !d.is_empty()) {
        output.push_str(&format!(" '{description}'"));
    }
    if let Some(project_id) = &created.project_id {
        output.push_str(&format!(" in project {project_id}"));
    }
    if let Some(interval) = &created.time_interval {
        output.push_str(&format!(" from {}", interval.start));
        if let Some(end) = &interval.end {
            output.push_str(&format!(" to {end}"));
        }
        if let Some(duration) = &interval.duration {
            output.push_str(&format!(" ({duration})"));
        }
    }
    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Live,
    DryRun,
    List,
}

pub fn format_summary(summary: &RunSummary, mode: RunMode) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Processed {} date(s), {} entr{}\n",
        summary.dates_processed,
        summary.entries_seen,
        if summary.entries_seen == 1 { "y" } else { "ies" }
    ));
    match mode {
        RunMode::Live => output.push_str(&format!("Submitted: {}\n", summary.submitted)),
        RunMode::DryRun => output.push_str(&format!("Would submit: {}\n", summary.would_submit)),
        RunMode::List => {}
    }

    if !summary.skipped.is_empty() {
        output.push_str("Skipped entries:\n");
        for entry in &summary.skipped {
            output.push_str(&format!(
                "  {}  '{}': {}\n",
                entry.date, entry.description, entry.reason
            ));
        }
    }

    if !summary.failed_submissions.is_empty() {
        output.push_str("Failed submissions:\n");
        for entry in &summary.failed_submissions {
            let status = entry
                .status
                .map(|status| status.to_string())
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "  {}  '{}' [{}]: {}\n",
                entry.date, entry.description, status, entry.reason
            ));
        }
    }

    if !summary.failed_dates.is_empty() {
        output.push_str("Failed dates:\n");
        for failed in &summary.failed_dates {
            output.push_str(&format!("  {}: {}\n", failed.date, failed.reason));
        }
    }

    output
}
