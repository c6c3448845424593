use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::config::HarvestConfig;
use crate::error::{AuthenticationError, SourceError};
use crate::models::{DailyResponse, TimeEntry, WhoAmI};
use crate::pipeline::TimeSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HarvestClient {
    client: Client,
    base_url: String,
    credentials: String,
}

impl HarvestClient {
    pub fn new(config: &HarvestConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("h2c/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| SourceError::Network(err.to_string()))?;
        let credentials = STANDARD.encode(format!("{}:{}", config.email, config.password));
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            credentials,
        })
    }

    pub fn authenticate(&self) -> Result<WhoAmI, AuthenticationError> {
        let url = format!("{}/account/who_am_i", self.base_url);
        self.fetch(url).map_err(authentication_error)
    }

    // Harvest addresses a day by its ordinal within the year.
    pub fn fetch_day(&self, date: NaiveDate) -> Result<Vec<TimeEntry>, SourceError> {
        let url = format!("{}/daily/{}/{}", self.base_url, date.ordinal(), date.year());
        let daily: DailyResponse = self.fetch(url)?;
        Ok(daily
            .day_entries
            .into_iter()
            .map(|entry| TimeEntry::from_day_entry(date, entry))
            .collect())
    }

    fn fetch<T: DeserializeOwned>(&self, url: String) -> Result<T, SourceError> {
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Basic {}", self.credentials))
            .send()
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        response
            .json::<T>()
            .map_err(|err| SourceError::Parse(err.to_string()))
    }
}

impl TimeSource for HarvestClient {
    fn entries_on_date(&self, date: NaiveDate) -> Result<Vec<TimeEntry>, SourceError> {
        self.fetch_day(date)
    }
}

fn authentication_error(err: SourceError) -> AuthenticationError {
    match err {
        SourceError::Status(status @ (401 | 403)) => AuthenticationError::Rejected(status),
        other => AuthenticationError::Unreachable(other.to_string()),
    }
}

fn network_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HarvestConfig {
        HarvestConfig {
            company_name: "acme".to_string(),
            email: "me@acme.test".to_string(),
            password: "secret".to_string(),
            base_url: "https://acme.harvestapp.com".to_string(),
        }
    }

    #[test]
    fn credentials_are_basic_auth_encoded() {
        let client = HarvestClient::new(&config()).unwrap();
        let decoded = STANDARD.decode(&client.credentials).unwrap();
        assert_eq!(decoded, b"me@acme.test:secret");
    }

    #[test]
    fn login_status_mapping() {
        let cases = [
            (SourceError::Status(401), Some(401)),
            (SourceError::Status(403), Some(403)),
            (SourceError::Status(404), None),
            (SourceError::Status(500), None),
            (SourceError::Timeout, None),
            (SourceError::Network("refused".to_string()), None),
            (SourceError::Parse("not json".to_string()), None),
        ];
        for (err, rejected) in cases {
            let message = err.to_string();
            match (authentication_error(err), rejected) {
                (AuthenticationError::Rejected(status), Some(expected)) => {
                    assert_eq!(status, expected)
                }
                (AuthenticationError::Unreachable(reason), None) => assert_eq!(reason, message),
                (other, expected) => panic!("{message}: got {other:?}, expected {expected:?}"),
            }
        }
    }

    #[test]
    fn unreachable_host_fails_authentication() {
        let mut config = config();
        config.base_url = "http://127.0.0.1:9".to_string();
        let client = HarvestClient::new(&config).unwrap();
        assert!(matches!(
            client.authenticate(),
            Err(AuthenticationError::Unreachable(_))
        ));
    }
}
