//! Price store port trait.

use crate::domain::error::EtlError;
use crate::domain::snapshot::{PriceRecord, Snapshot};
use chrono::NaiveDate;

/// Durable store of price records keyed by `(date, instrument_code)`.
pub trait PricePort {
    /// Create the keyed table if absent. Safe to call repeatedly.
    fn initialize_schema(&self) -> Result<(), EtlError>;

    /// Insert or replace every row of `snapshot` in one transaction.
    ///
    /// Returns the number of rows written. On error nothing from the snapshot
    /// is committed.
    fn upsert_snapshot(&self, snapshot: &Snapshot) -> Result<usize, EtlError>;

    fn fetch_records(&self, date: NaiveDate) -> Result<Vec<PriceRecord>, EtlError>;

    fn fetch_record(
        &self,
        date: NaiveDate,
        instrument_code: &str,
    ) -> Result<Option<PriceRecord>, EtlError>;

    fn count_rows(&self) -> Result<usize, EtlError>;
}
