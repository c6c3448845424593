use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
    label: String,
}

impl DateRange {
    pub fn current_week() -> Self {
        Self::week_of(Local::now().date_naive())
    }

    pub fn week_of(day: NaiveDate) -> Self {
        let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
        let sunday = monday + Duration::days(6);
        let label = format!("Week of {}", monday.format("%Y-%m-%d"));
        Self {
            start: monday,
            end: sunday,
            label,
        }
    }

    pub fn from_single(date: NaiveDate) -> Self {
        let label = format!("{}", date.format("%Y-%m-%d"));
        Self {
            start: date,
            end: date,
            label,
        }
    }

    pub fn from_bounds(start: NaiveDate, end: NaiveDate) -> Self {
        let label = if start == end {
            format!("{}", start.format("%Y-%m-%d"))
        } else {
            format!("{} → {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
        };
        Self { start, end, label }
    }

    pub fn from_options(
        date: Option<NaiveDate>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        Self::from_options_at(date, start_date, end_date, Local::now().date_naive())
    }

    fn from_options_at(
        date: Option<NaiveDate>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        if let Some(date) = date {
            return Ok(Self::from_single(date));
        }

        match (start_date, end_date) {
            (Some(start), Some(end)) => {
                if start > end {
                    return Err(ValidationError::DateRange(
                        "Start date cannot be after end date.".to_string(),
                    ));
                }
                Ok(Self::from_bounds(start, end))
            }
            (Some(start), None) => {
                if start > today {
                    return Err(ValidationError::DateRange(
                        "Start date cannot be after end date.".to_string(),
                    ));
                }
                Ok(Self::from_bounds(start, today))
            }
            (None, None) => Ok(Self::week_of(today)),
            (None, Some(_)) => Err(ValidationError::DateRange(
                "End date requires a start date.".to_string(),
            )),
        }
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.start.iter_days().take_while(|day| *day <= self.end).collect()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::Date(value.to_string()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .map_err(|_| ValidationError::Time(value.to_string()))
}
