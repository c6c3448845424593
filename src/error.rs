use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid start time '{0}': expected HH:MM:SS")]
    InvalidStartTime(String),

    #[error("Could not read env file {path}: {reason}")]
    EnvFile { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("Harvest rejected the credentials (status {0})")]
    Rejected(u16),

    #[error("Could not reach Harvest: {0}")]
    Unreachable(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Harvest request timed out")]
    Timeout,

    #[error("Harvest API error: {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected Harvest response: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("No workspaces found for this Clockify account")]
    NoWorkspace,

    #[error("There is no project named '{project}' in workspace '{workspace}'")]
    NoProject { workspace: String, project: String },

    #[error("There is no task named '{task}' in project '{project}'")]
    NoTask { project: String, task: String },

    #[error("{what} lookup returned status {status}")]
    Status { what: &'static str, status: u16 },

    #[error("{what} lookup failed: {reason}")]
    Request { what: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Clockify returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Clockify request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected Clockify response: {0}")]
    Parse(String),
}

impl SubmissionError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmissionError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Filter '{0}' is not in category=value form")]
    FilterFormat(String),

    #[error("Unknown filter category '{0}': expected client, project or task")]
    FilterCategory(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    Date(String),

    #[error("Invalid time '{0}': expected HH:MM:SS")]
    Time(String),

    #[error("{0}")]
    DateRange(String),

    #[error("Entry hours must be a positive number, got {0}")]
    Hours(String),
}

pub fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ConfigError>().is_some() {
        2
    } else if err.downcast_ref::<AuthenticationError>().is_some() {
        3
    } else {
        1
    }
}

pub const PARTIAL_FAILURE_EXIT_CODE: u8 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lists_every_key() {
        let err = ConfigError::Missing(vec!["H2C_HARVEST_EMAIL", "H2C_CLOCKIFY_API_KEY"]);
        assert_eq!(
            err.to_string(),
            "Missing required configuration: H2C_HARVEST_EMAIL, H2C_CLOCKIFY_API_KEY"
        );
    }

    #[test]
    fn exit_codes_by_kind() {
        let config = anyhow::Error::new(ConfigError::InvalidStartTime("9am".to_string()));
        let auth = anyhow::Error::new(AuthenticationError::Rejected(401));
        let other = anyhow::anyhow!("boom");
        assert_eq!(exit_code(&config), 2);
        assert_eq!(exit_code(&auth), 3);
        assert_eq!(exit_code(&other), 1);
    }

    #[test]
    fn exit_code_sees_through_context() {
        let err = anyhow::Error::new(AuthenticationError::Unreachable("dns".to_string()))
            .context("Harvest login failed");
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn submission_status_only_for_rejections() {
        let rejected = SubmissionError::Rejected {
            status: 400,
            body: "bad".to_string(),
        };
        assert_eq!(rejected.status(), Some(400));
        assert_eq!(SubmissionError::Timeout.status(), None);
    }
}
