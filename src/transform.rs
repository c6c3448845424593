use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::ValidationError;
use crate::models::{NewTimeEntry, TimeEntry};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

// Whole hours plus `fraction * 60` minutes, kept to microseconds.
pub fn hours_to_duration(hours: f64) -> Result<Duration, ValidationError> {
    let invalid = || ValidationError::Hours(hours.to_string());
    if !hours.is_finite() || hours <= 0.0 {
        return Err(invalid());
    }
    let whole = hours.trunc();
    let minutes = (hours - whole) * 60.0;
    let micros = (minutes * 60_000_000.0).round() as i64;
    Duration::try_hours(whole as i64)
        .and_then(|duration| duration.checked_add(&Duration::microseconds(micros)))
        .ok_or_else(invalid)
}

// Adds `hours` to a wall-clock time, truncating to whole seconds.
// Returns the new time and the number of midnights crossed.
pub fn add_time(start: NaiveTime, hours: f64) -> Result<(NaiveTime, i64), ValidationError> {
    let invalid = || ValidationError::Hours(hours.to_string());
    let anchor = NaiveDate::default().and_time(start);
    let end = anchor
        .checked_add_signed(hours_to_duration(hours)?)
        .map(truncate_to_second)
        .ok_or_else(invalid)?;
    // Less than a second of work would give a zero-length entry.
    if end <= anchor {
        return Err(invalid());
    }
    let days = (end.date() - anchor.date()).num_days();
    Ok((end.time(), days))
}

fn truncate_to_second(value: NaiveDateTime) -> NaiveDateTime {
    value - Duration::nanoseconds(i64::from(value.nanosecond()))
}

pub fn to_destination_entry(
    entry: &TimeEntry,
    date: NaiveDate,
    start_time: NaiveTime,
    project_id: &str,
) -> Result<NewTimeEntry, ValidationError> {
    let start = date.and_time(start_time);
    let (end_time, days) = add_time(start_time, entry.hours)?;
    let end = Duration::try_days(days)
        .and_then(|offset| date.checked_add_signed(offset))
        .ok_or_else(|| ValidationError::Hours(entry.hours.to_string()))?
        .and_time(end_time);

    Ok(NewTimeEntry {
        start: start.format(TIMESTAMP_FORMAT).to_string(),
        billable: true,
        description: entry.notes.clone(),
        project_id: project_id.to_string(),
        task_id: None,
        end: end.format(TIMESTAMP_FORMAT).to_string(),
        tag_ids: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(value: &str) -> NaiveTime {
        NaiveTime::parse_from_str(value, "%H:%M:%S").unwrap()
    }

    fn add(start: &str, hours: f64) -> (String, i64) {
        let (end, days) = add_time(time(start), hours).unwrap();
        (end.format("%H:%M:%S").to_string(), days)
    }

    fn entry(hours: f64, notes: &str) -> TimeEntry {
        TimeEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            client: "Acme".to_string(),
            project: "Website".to_string(),
            task: "Design".to_string(),
            hours,
            notes: notes.to_string(),
        }
    }

    #[test]
    fn add_time_splits_fractional_hours() {
        assert_eq!(add("09:00:00", 1.5), ("10:30:00".to_string(), 0));
        assert_eq!(add("09:00:00", 0.25), ("09:15:00".to_string(), 0));
    }

    #[test]
    fn add_time_truncates_to_seconds() {
        // 0.33h = 19.8 minutes = 19:48
        assert_eq!(add("09:00:00", 0.33), ("09:19:48".to_string(), 0));
        // 0.017h = 61.2 seconds
        assert_eq!(add("09:00:00", 0.017), ("09:01:01".to_string(), 0));
    }

    #[test]
    fn add_time_rolls_over_midnight() {
        assert_eq!(add("23:00:00", 2.0), ("01:00:00".to_string(), 1));
        assert_eq!(add("09:00:00", 40.0), ("01:00:00".to_string(), 2));
    }

    #[test]
    fn add_time_rejects_non_positive_hours() {
        assert_eq!(
            add_time(time("09:00:00"), 0.0),
            Err(ValidationError::Hours("0".to_string()))
        );
        assert!(add_time(time("09:00:00"), -1.0).is_err());
        assert!(add_time(time("09:00:00"), f64::NAN).is_err());
    }

    #[test]
    fn add_time_rejects_sub_second_hours() {
        // 0.0001h = 0.36 seconds
        assert_eq!(
            add_time(time("09:00:00"), 0.0001),
            Err(ValidationError::Hours("0.0001".to_string()))
        );
        assert_eq!(add("09:00:00", 1.0 / 3600.0), ("09:00:01".to_string(), 0));
    }

    #[test]
    fn huge_hours_are_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        for hours in [1e11, 1e13, f64::MAX] {
            assert_eq!(
                to_destination_entry(&entry(hours, "runaway"), date, time("09:00:00"), "p1"),
                Err(ValidationError::Hours(hours.to_string()))
            );
        }
    }

    #[test]
    fn sub_second_entry_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let result = to_destination_entry(&entry(0.0001, "blip"), date, time("09:00:00"), "p1");
        assert!(result.is_err());
    }

    #[test]
    fn transforms_whole_hours() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let result =
            to_destination_entry(&entry(2.0, "call"), date, time("09:00:00"), "p1").unwrap();
        assert_eq!(result.start, "2024-01-08T09:00:00.000Z");
        assert_eq!(result.end, "2024-01-08T11:00:00.000Z");
        assert!(result.billable);
        assert_eq!(result.task_id, None);
        assert_eq!(result.description, "call");
        assert_eq!(result.project_id, "p1");
        assert!(result.tag_ids.is_empty());
    }

    #[test]
    fn end_moves_to_next_day_after_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let result = to_destination_entry(&entry(2.0, ""), date, time("23:00:00"), "p1").unwrap();
        assert_eq!(result.start, "2024-01-08T23:00:00.000Z");
        assert_eq!(result.end, "2024-01-09T01:00:00.000Z");
        assert!(result.end > result.start);
    }

    #[test]
    fn notes_survive_serialization_verbatim() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let notes = "fixed \"quotes\", back\\slash\nand a tab\t";
        let result =
            to_destination_entry(&entry(1.0, notes), date, time("09:00:00"), "p1").unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["description"], notes);
    }
}
