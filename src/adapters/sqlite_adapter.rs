//! SQLite price store.

use crate::domain::config::PipelineConfig;
use crate::domain::error::EtlError;
use crate::domain::snapshot::{PriceRecord, Snapshot};
use crate::ports::price_port::PricePort;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Row};
use std::fs;
use std::path::Path;
use std::time::Duration;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "SELECT date, instrument_code, price_usd, fx_rate, price_local, source_url, source_ts
     FROM commodity_prices";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> EtlError {
    EtlError::Store {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> EtlError {
    EtlError::StoreQuery {
        reason: e.to_string(),
    }
}

impl SqliteAdapter {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, EtlError> {
        Self::open(&config.sqlite_path, config.sqlite_pool_size)
    }

    /// Open a file-backed store in WAL mode, creating parent directories.
    pub fn open(path: &Path, pool_size: u32) -> Result<Self, EtlError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))
        });
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, EtlError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, EtlError> {
        self.pool.get().map_err(pool_err)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PriceRecord> {
    let date_str: String = row.get(0)?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let ts_str: String = row.get(6)?;
    let source_ts = DateTime::parse_from_rfc3339(&ts_str)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(PriceRecord {
        date,
        instrument_code: row.get(1)?,
        price_usd: row.get(2)?,
        fx_rate: row.get(3)?,
        price_local: row.get(4)?,
        source_url: row.get(5)?,
        source_ts,
    })
}

impl PricePort for SqliteAdapter {
    fn initialize_schema(&self) -> Result<(), EtlError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS commodity_prices (
                date TEXT NOT NULL,
                instrument_code TEXT NOT NULL CHECK (length(instrument_code) > 0),
                price_usd REAL NOT NULL,
                fx_rate REAL NOT NULL,
                price_local REAL NOT NULL,
                source_url TEXT NOT NULL,
                source_ts TEXT NOT NULL,
                PRIMARY KEY (date, instrument_code)
            );",
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn upsert_snapshot(&self, snapshot: &Snapshot) -> Result<usize, EtlError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        let date = snapshot.date.format(DATE_FORMAT).to_string();
        let source_ts = snapshot
            .source_ts
            .to_rfc3339_opts(SecondsFormat::AutoSi, true);

        let mut written = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO commodity_prices
                        (date, instrument_code, price_usd, fx_rate, price_local, source_url, source_ts)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(date, instrument_code) DO UPDATE SET
                        price_usd = excluded.price_usd,
                        fx_rate = excluded.fx_rate,
                        price_local = excluded.price_local,
                        source_url = excluded.source_url,
                        source_ts = excluded.source_ts",
                )
                .map_err(query_err)?;

            for row in &snapshot.rows {
                written += stmt
                    .execute(params![
                        date,
                        row.instrument_code,
                        row.price_usd,
                        snapshot.fx_rate,
                        row.price_local,
                        row.source_url,
                        source_ts,
                    ])
                    .map_err(query_err)?;
            }
        }

        // Dropping `tx` without commit rolls the whole snapshot back.
        tx.commit().map_err(query_err)?;

        tracing::debug!(date = %snapshot.date, rows = written, "snapshot committed");
        Ok(written)
    }

    fn fetch_records(&self, date: NaiveDate) -> Result<Vec<PriceRecord>, EtlError> {
        let conn = self.conn()?;
        let query = format!("{SELECT_COLUMNS} WHERE date = ?1 ORDER BY instrument_code");

        let mut stmt = conn.prepare(&query).map_err(query_err)?;
        let rows = stmt
            .query_map(params![date.format(DATE_FORMAT).to_string()], record_from_row)
            .map_err(query_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(query_err)?);
        }
        Ok(records)
    }

    fn fetch_record(
        &self,
        date: NaiveDate,
        instrument_code: &str,
    ) -> Result<Option<PriceRecord>, EtlError> {
        let conn = self.conn()?;
        let query = format!("{SELECT_COLUMNS} WHERE date = ?1 AND instrument_code = ?2");

        let mut stmt = conn.prepare(&query).map_err(query_err)?;
        let mut rows = stmt
            .query_map(
                params![date.format(DATE_FORMAT).to_string(), instrument_code],
                record_from_row,
            )
            .map_err(query_err)?;

        rows.next().transpose().map_err(query_err)
    }

    fn count_rows(&self) -> Result<usize, EtlError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM commodity_prices", [], |row| row.get(0))
            .map_err(query_err)?;
        Ok(count as usize)
    }
}
