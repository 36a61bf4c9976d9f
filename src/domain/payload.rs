//! Raw payload handed from the extract stage to the transform stage.
//!
//! Stored as `raw.json` in the run directory:
//! `{"source_ts": .., "<code>": {"url": .., "html": ..}, .., "fx": {"url": .., "json": ..}}`.
//! Other top-level keys that are not page objects are ignored on read.

use crate::domain::error::EtlError;
use crate::domain::instrument::Instrument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const RAW_FILE: &str = "raw.json";

/// Top-level keys that can never name an instrument page.
pub const RESERVED_KEYS: &[&str] = &["source_ts", "fx"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePayload {
    pub url: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxPayload {
    pub url: String,
    pub json: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPayloadFile")]
pub struct RawPayload {
    pub source_ts: DateTime<Utc>,
    pub fx: FxPayload,
    /// Instrument pages keyed by lowercase instrument code.
    #[serde(flatten)]
    pub pages: BTreeMap<String, PagePayload>,
}

#[derive(Deserialize)]
struct RawPayloadFile {
    source_ts: DateTime<Utc>,
    fx: FxPayload,
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

impl From<RawPayloadFile> for RawPayload {
    fn from(file: RawPayloadFile) -> Self {
        let pages = file
            .rest
            .into_iter()
            .filter_map(|(key, value)| {
                serde_json::from_value::<PagePayload>(value)
                    .ok()
                    .map(|page| (key, page))
            })
            .collect();
        Self {
            source_ts: file.source_ts,
            fx: file.fx,
            pages,
        }
    }
}

impl RawPayload {
    pub fn new(source_ts: DateTime<Utc>, fx: FxPayload) -> Self {
        Self {
            source_ts,
            fx,
            pages: BTreeMap::new(),
        }
    }

    pub fn with_page(mut self, instrument: &Instrument, html: impl Into<String>) -> Self {
        self.insert_page(instrument, html);
        self
    }

    pub fn insert_page(&mut self, instrument: &Instrument, html: impl Into<String>) {
        self.pages.insert(
            instrument.payload_key(),
            PagePayload {
                url: instrument.url.clone(),
                html: html.into(),
            },
        );
    }

    pub fn page(&self, instrument: &Instrument) -> Result<&PagePayload, EtlError> {
        let key = instrument.payload_key();
        self.pages
            .get(&key)
            .ok_or_else(|| EtlError::malformed(format!("missing page `{key}`")))
    }

    pub fn from_json(content: &str) -> Result<Self, EtlError> {
        serde_json::from_str(content)
            .map_err(|e| EtlError::malformed(format!("{RAW_FILE}: {e}")))
    }

    pub fn path_in(run_dir: &Path) -> PathBuf {
        run_dir.join(RAW_FILE)
    }

    pub fn read_from(run_dir: &Path) -> Result<Self, EtlError> {
        let content = fs::read_to_string(Self::path_in(run_dir))?;
        Self::from_json(&content)
    }

    /// Write `raw.json`, replacing any payload left by an earlier attempt.
    pub fn write_to(&self, run_dir: &Path) -> Result<PathBuf, EtlError> {
        fs::create_dir_all(run_dir)?;
        let path = Self::path_in(run_dir);
        fs::write(&path, serde_json::to_string(self)?)?;
        Ok(path)
    }
}
