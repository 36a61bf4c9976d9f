//! Dated price snapshots and the records they expand to.

use crate::domain::currency::to_local;
use crate::domain::error::EtlError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CLEAN_FILE: &str = "clean.json";

/// A USD price resolved for one instrument in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrice {
    pub instrument_code: String,
    pub url: String,
    pub price_usd: f64,
}

/// One durable row, keyed by `(date, instrument_code)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub instrument_code: String,
    pub price_usd: f64,
    pub fx_rate: f64,
    pub price_local: f64,
    pub source_url: String,
    pub source_ts: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub instrument_code: String,
    pub price_usd: f64,
    pub price_local: f64,
    pub source_url: String,
}

/// All records of one run. Date, FX rate and timestamp are shared by every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub source_ts: DateTime<Utc>,
    pub target_currency: String,
    pub fx_rate: f64,
    pub rows: Vec<SnapshotRow>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows expanded to full records, in snapshot order.
    pub fn records(&self) -> Vec<PriceRecord> {
        self.rows
            .iter()
            .map(|row| PriceRecord {
                date: self.date,
                instrument_code: row.instrument_code.clone(),
                price_usd: row.price_usd,
                fx_rate: self.fx_rate,
                price_local: row.price_local,
                source_url: row.source_url.clone(),
                source_ts: self.source_ts,
            })
            .collect()
    }

    pub fn path_in(run_dir: &Path) -> PathBuf {
        run_dir.join(CLEAN_FILE)
    }

    pub fn read_from(run_dir: &Path) -> Result<Self, EtlError> {
        let content = fs::read_to_string(Self::path_in(run_dir))?;
        serde_json::from_str(&content)
            .map_err(|e| EtlError::malformed(format!("{CLEAN_FILE}: {e}")))
    }

    pub fn write_to(&self, run_dir: &Path) -> Result<PathBuf, EtlError> {
        fs::create_dir_all(run_dir)?;
        let path = Self::path_in(run_dir);
        fs::write(&path, serde_json::to_string(self)?)?;
        Ok(path)
    }
}

/// Build a snapshot from resolved prices. Pure; row order follows `resolved`.
pub fn assemble(
    date: NaiveDate,
    source_ts: DateTime<Utc>,
    target_currency: &str,
    fx_rate: f64,
    resolved: &[ResolvedPrice],
) -> Snapshot {
    let rows = resolved
        .iter()
        .map(|price| SnapshotRow {
            instrument_code: price.instrument_code.clone(),
            price_usd: price.price_usd,
            price_local: to_local(price.price_usd, fx_rate),
            source_url: price.url.clone(),
        })
        .collect();

    Snapshot {
        date,
        source_ts,
        target_currency: target_currency.to_string(),
        fx_rate,
        rows,
    }
}
