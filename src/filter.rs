use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::TimeEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Client,
    Project,
    Task,
}

impl Category {
    fn value_of<'a>(&self, entry: &'a TimeEntry) -> &'a str {
        match self {
            Category::Client => &entry.client,
            Category::Project => &entry.project,
            Category::Task => &entry.task,
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "client" => Ok(Category::Client),
            "project" => Ok(Category::Project),
            "task" => Ok(Category::Task),
            other => Err(ValidationError::FilterCategory(other.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Client => write!(f, "client"),
            Category::Project => write!(f, "project"),
            Category::Task => write!(f, "task"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    accepted: BTreeMap<Category, BTreeSet<String>>,
}

impl FilterCriteria {
    // Parses `category=value` items. One bad item rejects the whole set.
    pub fn parse<S: AsRef<str>>(items: &[S]) -> Result<Self, ValidationError> {
        let mut criteria = Self::default();
        for item in items {
            let item = item.as_ref();
            let (category, value) = item
                .split_once('=')
                .ok_or_else(|| ValidationError::FilterFormat(item.to_string()))?;
            let category: Category = category.trim().parse()?;
            let value = value.trim();
            if value.is_empty() {
                return Err(ValidationError::FilterFormat(item.to_string()));
            }
            criteria.insert(category, value);
        }
        Ok(criteria)
    }

    pub fn insert(&mut self, category: Category, value: impl Into<String>) {
        self.accepted.entry(category).or_default().insert(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.values().all(BTreeSet::is_empty)
    }

    pub fn matches(&self, entry: &TimeEntry) -> bool {
        if self.is_empty() {
            return true;
        }
        self.accepted
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .any(|(category, values)| values.contains(category.value_of(entry)))
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self
            .accepted
            .iter()
            .flat_map(|(category, values)| {
                values
                    .iter()
                    .map(move |value| format!("{category}={value}"))
            })
            .collect();
        write!(f, "{}", items.join(" "))
    }
}

pub fn criteria_from_args<S: AsRef<str>>(items: &[S]) -> Option<FilterCriteria> {
    if items.is_empty() {
        return None;
    }
    match FilterCriteria::parse(items) {
        Ok(criteria) => Some(criteria),
        Err(err) => {
            tracing::warn!("{err}; ignoring all filters");
            None
        }
    }
}

pub fn apply(criteria: Option<&FilterCriteria>, entries: Vec<TimeEntry>) -> Vec<TimeEntry> {
    let Some(criteria) = criteria else {
        return entries;
    };
    entries.into_iter().filter(|entry| criteria.matches(entry)).collect()
}
