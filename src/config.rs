use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;

use crate::dates::parse_time;
use crate::error::ConfigError;

const HARVEST_COMPANY_NAME: &str = "H2C_HARVEST_COMPANY_NAME";
const HARVEST_EMAIL: &str = "H2C_HARVEST_EMAIL";
const HARVEST_PASSWORD: &str = "H2C_HARVEST_PASSWORD";
const HARVEST_BASE_URL: &str = "H2C_HARVEST_BASE_URL";
const CLOCKIFY_API_KEY: &str = "H2C_CLOCKIFY_API_KEY";
const CLOCKIFY_START_TIME: &str = "H2C_CLOCKIFY_START_TIME";
const CLOCKIFY_PROJECT_NAME: &str = "H2C_CLOCKIFY_PROJECT_NAME";
const CLOCKIFY_BASE_URL: &str = "H2C_CLOCKIFY_BASE_URL";
const FILTER: &str = "H2C_FILTER";

const DEFAULT_CLOCKIFY_BASE_URL: &str = "https://api.clockify.me/api/v1";

#[derive(Clone)]
pub struct HarvestConfig {
    pub company_name: String,
    pub email: String,
    pub password: String,
    pub base_url: String,
}

impl fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("company_name", &self.company_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Clone)]
pub struct ClockifyConfig {
    pub api_key: String,
    pub start_time: NaiveTime,
    pub project_name: String,
    pub base_url: String,
}

impl fmt::Debug for ClockifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockifyConfig")
            .field("api_key", &"[REDACTED]")
            .field("start_time", &self.start_time)
            .field("project_name", &self.project_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub clockify: ClockifyConfig,
    pub filter: Vec<String>,
}

impl Config {
    // Reads the process environment, then `env_file`, `./.env` and
    // `~/.h2c.env` in that order of precedence.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults: Vec<PathBuf> = [Some(PathBuf::from(".env")), home_env_path()]
            .into_iter()
            .flatten()
            .collect();
        let files = read_env_files(env_file, &defaults)?;
        Self::from_lookup(|key| layered(env::var(key).ok(), &files, key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut missing = Vec::new();
        let mut require = |key: &'static str| {
            let value = read(key);
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let company_name = require(HARVEST_COMPANY_NAME);
        let email = require(HARVEST_EMAIL);
        let password = require(HARVEST_PASSWORD);
        let api_key = require(CLOCKIFY_API_KEY);
        let start_time = require(CLOCKIFY_START_TIME);
        let project_name = require(CLOCKIFY_PROJECT_NAME);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let start_time =
            parse_time(&start_time).map_err(|_| ConfigError::InvalidStartTime(start_time.clone()))?;

        let harvest_base_url = read(HARVEST_BASE_URL)
            .unwrap_or_else(|| format!("https://{company_name}.harvestapp.com"));
        let clockify_base_url =
            read(CLOCKIFY_BASE_URL).unwrap_or_else(|| DEFAULT_CLOCKIFY_BASE_URL.to_string());
        let filter = read(FILTER)
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Self {
            harvest: HarvestConfig {
                company_name,
                email,
                password,
                base_url: trim_url(harvest_base_url),
            },
            clockify: ClockifyConfig {
                api_key,
                start_time,
                project_name,
                base_url: trim_url(clockify_base_url),
            },
            filter,
        })
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

// `env_file` must exist; the default locations are read only when present.
// The result is ordered highest precedence first.
fn read_env_files(
    env_file: Option<&Path>,
    defaults: &[PathBuf],
) -> Result<Vec<HashMap<String, String>>, ConfigError> {
    let mut files = Vec::new();
    if let Some(path) = env_file {
        files.push(read_env_file(path)?);
    }
    for path in defaults {
        if path.is_file() {
            tracing::debug!("Loading environment from {}", path.display());
            files.push(read_env_file(path)?);
        }
    }
    Ok(files)
}

fn layered(
    process: Option<String>,
    files: &[HashMap<String, String>],
    key: &str,
) -> Option<String> {
    process.or_else(|| files.iter().find_map(|file| file.get(key).cloned()))
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let to_error = |reason: String| ConfigError::EnvFile {
        path: path.display().to_string(),
        reason,
    };
    let iter = dotenvy::from_path_iter(path).map_err(|err| to_error(err.to_string()))?;
    iter.map(|item| item.map_err(|err| to_error(err.to_string())))
        .collect()
}

fn home_env_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".h2c.env");
    Some(path)
}
