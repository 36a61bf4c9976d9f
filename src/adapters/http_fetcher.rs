//! Blocking HTTP source fetcher.

use crate::domain::config::HttpSettings;
use crate::domain::error::EtlError;
use crate::ports::fetch_port::FetchPort;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

pub struct HttpFetcher {
    client: Client,
}

fn fetch_err(url: &str, e: impl std::fmt::Display) -> EtlError {
    EtlError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, EtlError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&settings.user_agent).map_err(|e| {
            EtlError::ConfigInvalid {
                section: "http".into(),
                key: "user_agent".into(),
                reason: e.to_string(),
            }
        })?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| fetch_err("<client>", e))?;

        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<Response, EtlError> {
        tracing::debug!(url, "fetching");
        let response = self.client.get(url).send().map_err(|e| fetch_err(url, e))?;
        response.error_for_status().map_err(|e| fetch_err(url, e))
    }
}

impl FetchPort for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, EtlError> {
        self.get(url)?.text().map_err(|e| fetch_err(url, e))
    }

    fn fetch_json(&self, url: &str) -> Result<Value, EtlError> {
        self.get(url)?.json().map_err(|e| fetch_err(url, e))
    }
}
