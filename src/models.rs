use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct DailyResponse {
    #[serde(default)]
    pub day_entries: Vec<DayEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayEntry {
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    pub hours: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhoAmI {
    pub user: HarvestUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HarvestUser {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub date: NaiveDate,
    pub client: String,
    pub project: String,
    pub task: String,
    pub hours: f64,
    pub notes: String,
}

impl TimeEntry {
    pub fn from_day_entry(date: NaiveDate, entry: DayEntry) -> Self {
        Self {
            date,
            client: entry.client.unwrap_or_default(),
            project: entry.project.unwrap_or_default(),
            task: entry.task.unwrap_or_default(),
            hours: entry.hours,
            notes: entry.notes.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeEntry {
    pub start: String,
    pub billable: bool,
    pub description: String,
    pub project_id: String,
    pub task_id: Option<String>,
    pub end: String,
    pub tag_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTimeEntry {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub time_interval: Option<TimeInterval>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeInterval {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_entry_tolerates_missing_text_fields() {
        let body = r#"{"day_entries":[{"id":1,"hours":1.25,"notes":null,"project":"Site"}]}"#;
        let daily: DailyResponse = serde_json::from_str(body).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let entry = TimeEntry::from_day_entry(date, daily.day_entries[0].clone());
        assert_eq!(entry.project, "Site");
        assert_eq!(entry.client, "");
        assert_eq!(entry.notes, "");
        assert_eq!(entry.hours, 1.25);
    }

    #[test]
    fn empty_day_has_no_entries() {
        let daily: DailyResponse = serde_json::from_str(r#"{"projects":[]}"#).unwrap();
        assert!(daily.day_entries.is_empty());
    }

    #[test]
    fn new_entry_uses_clockify_field_names() {
        let entry = NewTimeEntry {
            start: "2024-01-08T09:00:00.000Z".to_string(),
            billable: true,
            description: "say \"hi\"\n".to_string(),
            project_id: "p1".to_string(),
            task_id: None,
            end: "2024-01-08T10:00:00.000Z".to_string(),
            tag_ids: Vec::new(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["projectId"], "p1");
        assert!(value["taskId"].is_null());
        assert_eq!(value["tagIds"], serde_json::json!([]));
        assert_eq!(value["billable"], true);
        assert_eq!(value["description"], "say \"hi\"\n");
    }

    #[test]
    fn created_entry_reads_interval() {
        let body = r#"{"id":"e1","description":"call","projectId":"p1",
            "timeInterval":{"start":"2024-01-08T09:00:00Z",
                "end":"2024-01-08T11:00:00Z","duration":"PT2H"},
            "userId":"u1"}"#;
        let created: CreatedTimeEntry = serde_json::from_str(body).unwrap();
        assert_eq!(created.id, "e1");
        assert_eq!(created.time_interval.unwrap().duration.as_deref(), Some("PT2H"));
    }
}
