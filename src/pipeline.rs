//! Extract, transform and load stages, and the orchestrator that sequences them.
//!
//! Stages hand off through the run directory (`raw.json`, then `clean.json`)
//! and depend only on those files plus the configuration, so any stage can be
//! re-run from scratch after a failure.

use crate::domain::config::PipelineConfig;
use crate::domain::currency::fx_rate;
use crate::domain::error::EtlError;
use crate::domain::instrument::Instrument;
use crate::domain::payload::{FxPayload, RawPayload};
use crate::domain::price_resolver::resolve_price;
use crate::domain::snapshot::{assemble, ResolvedPrice, Snapshot};
use crate::ports::fetch_port::FetchPort;
use crate::ports::price_port::PricePort;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;

/// Fetch every instrument page and the FX document, one after another.
pub fn extract(
    fetcher: &dyn FetchPort,
    config: &PipelineConfig,
    source_ts: DateTime<Utc>,
) -> Result<RawPayload, EtlError> {
    let mut payload = RawPayload::new(
        source_ts,
        FxPayload {
            url: config.fx_url.clone(),
            json: serde_json::Value::Null,
        },
    );

    for instrument in &config.instruments {
        tracing::info!(code = %instrument.code, url = %instrument.url, "fetching quote page");
        let html = fetcher.fetch_text(&instrument.url)?;
        payload.insert_page(instrument, html);
    }

    tracing::info!(url = %config.fx_url, "fetching fx rates");
    payload.fx.json = fetcher.fetch_json(&config.fx_url)?;

    Ok(payload)
}

/// Resolve one USD price per instrument, in instrument order.
pub fn resolve_prices(
    payload: &RawPayload,
    instruments: &[Instrument],
) -> Result<Vec<ResolvedPrice>, EtlError> {
    instruments
        .iter()
        .map(|instrument| -> Result<ResolvedPrice, EtlError> {
            let page = payload.page(instrument)?;
            let price_usd =
                resolve_price(&page.html).map_err(|e| e.for_instrument(&instrument.code))?;
            tracing::info!(code = %instrument.code, price_usd, "resolved price");
            Ok(ResolvedPrice {
                instrument_code: instrument.code.clone(),
                url: page.url.clone(),
                price_usd,
            })
        })
        .collect()
}

/// Turn a raw payload into a dated snapshot. Fails before resolving any page
/// if the FX rate is missing.
pub fn transform(
    payload: &RawPayload,
    config: &PipelineConfig,
    date: NaiveDate,
) -> Result<Snapshot, EtlError> {
    let rate = fx_rate(&payload.fx.json, &config.target_currency)?;
    tracing::info!(currency = %config.target_currency, rate, "fx rate");

    let resolved = resolve_prices(payload, &config.instruments)?;
    Ok(assemble(
        date,
        payload.source_ts,
        &config.target_currency,
        rate,
        &resolved,
    ))
}

pub fn load(store: &dyn PricePort, snapshot: &Snapshot) -> Result<usize, EtlError> {
    let written = store.upsert_snapshot(snapshot)?;
    tracing::info!(date = %snapshot.date, rows = written, "snapshot loaded");
    Ok(written)
}

/// Extract stage: fetch sources and write `raw.json`.
pub fn run_extract(
    fetcher: &dyn FetchPort,
    config: &PipelineConfig,
    source_ts: DateTime<Utc>,
) -> Result<PathBuf, EtlError> {
    let payload = extract(fetcher, config, source_ts)?;
    let path = payload.write_to(&config.run_dir)?;
    tracing::info!(path = %path.display(), "wrote raw payloads");
    Ok(path)
}

/// Transform stage: read `raw.json`, write `clean.json`.
pub fn run_transform(config: &PipelineConfig, date: NaiveDate) -> Result<Snapshot, EtlError> {
    let payload = RawPayload::read_from(&config.run_dir)?;
    let snapshot = transform(&payload, config, date)?;
    let path = snapshot.write_to(&config.run_dir)?;
    tracing::info!(path = %path.display(), rows = snapshot.len(), "wrote transformed dataset");
    Ok(snapshot)
}

/// Load stage: read `clean.json` and upsert it.
pub fn run_load(store: &dyn PricePort, config: &PipelineConfig) -> Result<usize, EtlError> {
    let snapshot = Snapshot::read_from(&config.run_dir)?;
    load(store, &snapshot)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub raw_path: PathBuf,
    pub snapshot: Snapshot,
    pub rows_loaded: usize,
}

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// Runs init, extract, transform and load in order, retrying each stage
/// under the configured policy.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    fetcher: &'a dyn FetchPort,
    store: &'a dyn PricePort,
    clock: Clock,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        fetcher: &'a dyn FetchPort,
        store: &'a dyn PricePort,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
            clock: Box::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn run(&self, date: NaiveDate) -> Result<RunSummary, EtlError> {
        let retry = &self.config.retry;

        retry.run("init", || self.store.initialize_schema())?;
        let raw_path = retry.run("extract", || {
            run_extract(self.fetcher, self.config, (self.clock)())
        })?;
        let snapshot = retry.run("transform", || run_transform(self.config, date))?;
        let rows_loaded = retry.run("load", || run_load(self.store, self.config))?;

        tracing::info!(%date, rows = rows_loaded, "pipeline finished");
        Ok(RunSummary {
            raw_path,
            snapshot,
            rows_loaded,
        })
    }
}
