use std::io::{self, Write};

use chrono::{NaiveDate, NaiveTime};

use crate::dates::DateRange;
use crate::error::{ResolutionError, SourceError, SubmissionError};
use crate::filter::{self, FilterCriteria};
use crate::models::{CreatedTimeEntry, NewTimeEntry, TimeEntry};
use crate::output;
use crate::transform::to_destination_entry;

pub trait TimeSource {
    fn entries_on_date(&self, date: NaiveDate) -> Result<Vec<TimeEntry>, SourceError>;
}

pub trait TimeSink {
    fn workspace_id(&self) -> Result<String, ResolutionError>;
    fn project_id(&self, workspace_id: &str, name: &str) -> Result<String, ResolutionError>;
    #[allow(dead_code, reason = "entries are submitted without a task until task mapping exists")]
    fn task_id(
        &self,
        workspace_id: &str,
        project_id: &str,
        name: &str,
    ) -> Result<String, ResolutionError>;
    fn submit(
        &self,
        workspace_id: &str,
        entry: &NewTimeEntry,
    ) -> Result<CreatedTimeEntry, SubmissionError>;
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub start_time: NaiveTime,
    pub project_name: String,
    pub filter: Option<FilterCriteria>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedDate {
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedEntry {
    pub date: NaiveDate,
    pub description: String,
    pub status: Option<u16>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub dates_processed: usize,
    pub entries_seen: usize,
    pub submitted: usize,
    pub would_submit: usize,
    pub skipped: Vec<FailedEntry>,
    pub failed_submissions: Vec<FailedEntry>,
    pub failed_dates: Vec<FailedDate>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed_dates.is_empty() || !self.failed_submissions.is_empty()
    }
}

#[derive(Debug, Default)]
struct ResolvedIds {
    workspace_id: Option<String>,
    project_id: Option<String>,
}

impl ResolvedIds {
    fn resolve<D: TimeSink>(
        &mut self,
        sink: &D,
        project_name: &str,
    ) -> Result<(String, String), ResolutionError> {
        let workspace_id = match &self.workspace_id {
            Some(id) => id.clone(),
            None => {
                let id = sink.workspace_id()?;
                tracing::debug!("Resolved workspace id {id}");
                self.workspace_id.insert(id).clone()
            }
        };
        let project_id = match &self.project_id {
            Some(id) => id.clone(),
            None => {
                let id = sink.project_id(&workspace_id, project_name)?;
                tracing::debug!("Resolved project '{project_name}' to {id}");
                self.project_id.insert(id).clone()
            }
        };
        Ok((workspace_id, project_id))
    }
}

pub struct Pipeline<'a, S, D> {
    source: &'a S,
    sink: &'a D,
    options: &'a RunOptions,
    ids: ResolvedIds,
}

impl<'a, S: TimeSource, D: TimeSink> Pipeline<'a, S, D> {
    pub fn new(source: &'a S, sink: &'a D, options: &'a RunOptions) -> Self {
        Self {
            source,
            sink,
            options,
            ids: ResolvedIds::default(),
        }
    }

    // Copies every date in `range`. Per-date and per-entry failures are
    // recorded in the summary and never stop the run.
    pub fn run<W: Write>(&mut self, range: &DateRange, out: &mut W) -> io::Result<RunSummary> {
        let mut summary = RunSummary::default();
        tracing::info!("Copying {} ({} days)", range.label(), range.days().len());
        for date in range.days() {
            self.run_date(date, out, &mut summary)?;
        }
        Ok(summary)
    }

    fn run_date<W: Write>(
        &mut self,
        date: NaiveDate,
        out: &mut W,
        summary: &mut RunSummary,
    ) -> io::Result<()> {
        tracing::info!("----- {date} -----");

        let resolved = self.ids.resolve(self.sink, &self.options.project_name);
        let (workspace_id, project_id) = match resolved {
            Ok(ids) => ids,
            Err(err) => {
                tracing::error!("{date}: could not resolve Clockify ids: {err}");
                summary.failed_dates.push(FailedDate {
                    date,
                    reason: err.to_string(),
                });
                return Ok(());
            }
        };

        let entries = match self.source.entries_on_date(date) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!("{date}: could not fetch Harvest entries: {err}");
                summary.failed_dates.push(FailedDate {
                    date,
                    reason: err.to_string(),
                });
                return Ok(());
            }
        };
        let fetched = entries.len();
        let entries = filter::apply(self.options.filter.as_ref(), entries);
        tracing::debug!("{date}: {} of {fetched} entries passed the filter", entries.len());
        summary.entries_seen += entries.len();

        for entry in &entries {
            let transformed =
                to_destination_entry(entry, entry.date, self.options.start_time, &project_id);
            let payload = match transformed {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::warn!("{date}: skipping '{}': {err}", entry.notes);
                    summary.skipped.push(FailedEntry {
                        date,
                        description: entry.notes.clone(),
                        status: None,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if self.options.dry_run {
                write!(out, "{}", output::format_dry_run(date, &payload))?;
                summary.would_submit += 1;
                continue;
            }

            match self.sink.submit(&workspace_id, &payload) {
                Ok(created) => {
                    tracing::info!("{date}: {}", output::format_created(&created));
                    summary.submitted += 1;
                }
                Err(err) => {
                    tracing::error!("{date}: could not create '{}': {err}", payload.description);
                    summary.failed_submissions.push(FailedEntry {
                        date,
                        description: payload.description.clone(),
                        status: err.status(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        summary.dates_processed += 1;
        Ok(())
    }
}

pub fn list_entries<S: TimeSource, W: Write>(
    source: &S,
    range: &DateRange,
    criteria: Option<&FilterCriteria>,
    out: &mut W,
) -> io::Result<RunSummary> {
    let mut summary = RunSummary::default();
    for date in range.days() {
        match source.entries_on_date(date) {
            Ok(entries) => {
                let entries = filter::apply(criteria, entries);
                summary.entries_seen += entries.len();
                summary.dates_processed += 1;
                write!(out, "{}", output::format_day_listing(date, &entries))?;
            }
            Err(err) => {
                tracing::error!("{date}: could not fetch Harvest entries: {err}");
                summary.failed_dates.push(FailedDate {
                    date,
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(summary)
}
