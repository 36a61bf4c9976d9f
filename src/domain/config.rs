//! Immutable pipeline configuration, built once at start-up.

use crate::domain::error::EtlError;
use crate::domain::instrument::{default_url, parse_codes, Instrument, DEFAULT_INSTRUMENTS};
use crate::domain::retry::RetryPolicy;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FX_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";
pub const DEFAULT_TARGET_CURRENCY: &str = "MRU";
pub const DEFAULT_RUN_DIR: &str = "/tmp";
pub const DEFAULT_SQLITE_PATH: &str = "/shared/sqlite/etl.db";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:146.0) Gecko/20100101 Firefox/146.0";
pub const DEFAULT_HTTP_TIMEOUT_SECS: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs_f64(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub instruments: Vec<Instrument>,
    pub fx_url: String,
    pub target_currency: String,
    pub run_dir: PathBuf,
    pub sqlite_path: PathBuf,
    pub sqlite_pool_size: u32,
    pub retry: RetryPolicy,
    pub http: HttpSettings,
}

impl PipelineConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EtlError> {
        let instruments = build_instruments(config)?;
        let target_currency = build_target_currency(config)?;
        let retry = build_retry(config)?;
        let http = build_http(config)?;

        let pool_size = config.get_int("sqlite", "pool_size", 4);
        if pool_size < 1 {
            return Err(invalid("sqlite", "pool_size", "pool_size must be at least 1"));
        }

        Ok(Self {
            instruments,
            fx_url: config
                .get_string("sources", "fx_url")
                .unwrap_or_else(|| DEFAULT_FX_URL.to_string()),
            target_currency,
            run_dir: config
                .get_string("paths", "run_dir")
                .unwrap_or_else(|| DEFAULT_RUN_DIR.to_string())
                .into(),
            sqlite_path: config
                .get_string("sqlite", "path")
                .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string())
                .into(),
            sqlite_pool_size: pool_size as u32,
            retry,
            http,
        })
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> EtlError {
    EtlError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn build_instruments(config: &dyn ConfigPort) -> Result<Vec<Instrument>, EtlError> {
    let codes = match config.get_string("sources", "instruments") {
        Some(list) => parse_codes(&list)
            .map_err(|e| invalid("sources", "instruments", &e.to_string()))?,
        None => DEFAULT_INSTRUMENTS
            .iter()
            .map(|(code, _)| code.to_string())
            .collect(),
    };

    codes
        .into_iter()
        .map(|code| -> Result<Instrument, EtlError> {
            let key = format!("{}_url", code.to_lowercase());
            let url = config
                .get_string("sources", &key)
                .or_else(|| default_url(&code).map(String::from))
                .ok_or_else(|| EtlError::ConfigMissing {
                    section: "sources".into(),
                    key,
                })?;
            Ok(Instrument::new(code, url))
        })
        .collect()
}

fn build_target_currency(config: &dyn ConfigPort) -> Result<String, EtlError> {
    let code = config
        .get_string("sources", "target_currency")
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_else(|| DEFAULT_TARGET_CURRENCY.to_string());
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid(
            "sources",
            "target_currency",
            "target_currency must be a three-letter currency code",
        ));
    }
    Ok(code)
}

fn build_retry(config: &dyn ConfigPort) -> Result<RetryPolicy, EtlError> {
    let defaults = RetryPolicy::default();
    let attempts = config.get_int("retry", "max_attempts", defaults.max_attempts as i64);
    if attempts < 1 {
        return Err(invalid("retry", "max_attempts", "max_attempts must be at least 1"));
    }
    let delay = config.get_double("retry", "delay_seconds", defaults.delay.as_secs_f64());
    if !delay.is_finite() || delay < 0.0 {
        return Err(invalid("retry", "delay_seconds", "delay_seconds must be non-negative"));
    }
    let delay = Duration::try_from_secs_f64(delay)
        .map_err(|e| invalid("retry", "delay_seconds", &e.to_string()))?;
    Ok(RetryPolicy::new(attempts as u32, delay))
}

fn build_http(config: &dyn ConfigPort) -> Result<HttpSettings, EtlError> {
    let timeout = config.get_double("http", "timeout_seconds", DEFAULT_HTTP_TIMEOUT_SECS);
    if !timeout.is_finite() || timeout <= 0.0 {
        return Err(invalid("http", "timeout_seconds", "timeout_seconds must be positive"));
    }
    let timeout = Duration::try_from_secs_f64(timeout)
        .map_err(|e| invalid("http", "timeout_seconds", &e.to_string()))?;
    Ok(HttpSettings {
        timeout,
        user_agent: config
            .get_string("http", "user_agent")
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
    })
}
