use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::config::ClockifyConfig;
use crate::error::{ResolutionError, SubmissionError};
use crate::models::{CreatedTimeEntry, NewTimeEntry, Project, Task, Workspace};
use crate::pipeline::TimeSink;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ClockifyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ClockifyClient {
    pub fn new(config: &ClockifyConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("h2c/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn fetch_workspaces(&self) -> Result<Vec<Workspace>, ResolutionError> {
        let url = format!("{}/workspaces", self.base_url);
        self.fetch("Workspace", url, &[])
    }

    pub fn fetch_projects(
        &self,
        workspace_id: &str,
        name: &str,
    ) -> Result<Vec<Project>, ResolutionError> {
        let url = format!("{}/workspaces/{}/projects", self.base_url, workspace_id);
        self.fetch("Project", url, &[("name", name), ("strict-name-search", "true")])
    }

    pub fn fetch_tasks(
        &self,
        workspace_id: &str,
        project_id: &str,
        name: &str,
    ) -> Result<Vec<Task>, ResolutionError> {
        let url = format!(
            "{}/workspaces/{}/projects/{}/tasks",
            self.base_url, workspace_id, project_id
        );
        self.fetch("Task", url, &[("name", name)])
    }

    pub fn create_time_entry(
        &self,
        workspace_id: &str,
        entry: &NewTimeEntry,
    ) -> Result<CreatedTimeEntry, SubmissionError> {
        let url = format!("{}/workspaces/{}/time-entries", self.base_url, workspace_id);
        tracing::debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .header("X-Api-Key", &self.api_key)
            .json(entry)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    SubmissionError::Timeout
                } else {
                    SubmissionError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| SubmissionError::Network(err.to_string()))?;
        created_entry(status, &body)
    }

    fn fetch<T: DeserializeOwned>(
        &self,
        what: &'static str,
        url: String,
        params: &[(&str, &str)],
    ) -> Result<T, ResolutionError> {
        let request_error = |reason: String| ResolutionError::Request { what, reason };
        let url = if params.is_empty() {
            reqwest::Url::parse(&url)
        } else {
            reqwest::Url::parse_with_params(&url, params)
        }
        .map_err(|err| request_error(err.to_string()))?;
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    request_error("request timed out".to_string())
                } else {
                    request_error(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ResolutionError::Status {
                what,
                status: response.status().as_u16(),
            });
        }

        response
            .json::<T>()
            .map_err(|err| request_error(err.to_string()))
    }
}

impl TimeSink for ClockifyClient {
    // Always the first workspace on the account.
    fn workspace_id(&self) -> Result<String, ResolutionError> {
        let workspace = self
            .fetch_workspaces()?
            .into_iter()
            .next()
            .ok_or(ResolutionError::NoWorkspace)?;
        tracing::debug!("Using workspace '{}'", workspace.name);
        Ok(workspace.id)
    }

    fn project_id(&self, workspace_id: &str, name: &str) -> Result<String, ResolutionError> {
        self.fetch_projects(workspace_id, name)?
            .into_iter()
            .find(|project| project.name == name)
            .map(|project| project.id)
            .ok_or_else(|| ResolutionError::NoProject {
                workspace: workspace_id.to_string(),
                project: name.to_string(),
            })
    }

    fn task_id(
        &self,
        workspace_id: &str,
        project_id: &str,
        name: &str,
    ) -> Result<String, ResolutionError> {
        let tasks = self.fetch_tasks(workspace_id, project_id, name)?;
        pick_task(tasks, name).ok_or_else(|| ResolutionError::NoTask {
            project: project_id.to_string(),
            task: name.to_string(),
        })
    }

    fn submit(
        &self,
        workspace_id: &str,
        entry: &NewTimeEntry,
    ) -> Result<CreatedTimeEntry, SubmissionError> {
        self.create_time_entry(workspace_id, entry)
    }
}

// Anything but 201 is a rejection, even other 2xx codes.
fn created_entry(status: StatusCode, body: &str) -> Result<CreatedTimeEntry, SubmissionError> {
    if status != StatusCode::CREATED {
        return Err(SubmissionError::Rejected {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    serde_json::from_str(body).map_err(|err| SubmissionError::Parse(err.to_string()))
}

// Exact name match when there is one, otherwise whatever Clockify ranked first.
fn pick_task(tasks: Vec<Task>, name: &str) -> Option<String> {
    let exact = tasks.iter().position(|task| task.name == name);
    tasks
        .into_iter()
        .nth(exact.unwrap_or(0))
        .map(|task| task.id)
}
