//! CLI definition and dispatch.

use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::env_config_adapter::{EnvConfigAdapter, LayeredConfig};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::http_fetcher::HttpFetcher;
use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::domain::config::PipelineConfig;
use crate::domain::error::EtlError;
use crate::domain::snapshot::Snapshot;
use crate::pipeline::{self, Pipeline};
use crate::ports::price_port::PricePort;

#[derive(Parser, Debug)]
#[command(name = "pricetl", about = "Commodity price ETL into a local-currency SQLite store")]
pub struct Cli {
    /// INI configuration file; environment variables take precedence over it
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the price table if it does not exist
    Init,
    /// Fetch quote pages and FX rates into raw.json
    Extract,
    /// Resolve prices from raw.json into clean.json
    Transform {
        /// Snapshot date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Upsert clean.json into the store
    Load,
    /// Run init, extract, transform and load with retries
    Run {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Print stored records for a date
    Show {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date `{s}` (expected YYYY-MM-DD)"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Layer the environment over an optional INI file and build the pipeline config.
pub fn build_config(
    path: Option<&PathBuf>,
    env: EnvConfigAdapter,
) -> Result<PipelineConfig, EtlError> {
    let mut layers = LayeredConfig::new().with_layer(env);
    if let Some(path) = path {
        let file = FileConfigAdapter::from_file(path).map_err(|e| EtlError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        layers = layers.with_layer(file);
    }
    PipelineConfig::from_config(&layers)
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match build_config(cli.config.as_ref(), EnvConfigAdapter::from_env()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    match dispatch(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

fn dispatch(command: Command, config: &PipelineConfig) -> Result<(), EtlError> {
    match command {
        Command::Init => {
            let store = SqliteAdapter::from_config(config)?;
            store.initialize_schema()?;
            tracing::info!(path = %config.sqlite_path.display(), "sqlite initialized");
        }
        Command::Extract => {
            let fetcher = HttpFetcher::new(&config.http)?;
            pipeline::run_extract(&fetcher, config, Utc::now())?;
        }
        Command::Transform { date } => {
            pipeline::run_transform(config, date.unwrap_or_else(today))?;
        }
        Command::Load => {
            let store = SqliteAdapter::from_config(config)?;
            let rows = pipeline::run_load(&store, config)?;
            tracing::info!(rows, path = %config.sqlite_path.display(), "load finished");
        }
        Command::Run { date } => {
            let fetcher = HttpFetcher::new(&config.http)?;
            let store = SqliteAdapter::from_config(config)?;
            let summary = Pipeline::new(config, &fetcher, &store).run(date.unwrap_or_else(today))?;
            println!("{}", format_summary(&summary.snapshot));
        }
        Command::Show { date } => {
            let store = SqliteAdapter::from_config(config)?;
            let date = date.unwrap_or_else(today);
            let records = store.fetch_records(date)?;
            if records.is_empty() {
                println!("no records for {date}");
            }
            for r in records {
                println!(
                    "{}  {:<8} {:>14.4} USD  x {:<10.4} = {:>16.4}  {}",
                    r.date, r.instrument_code, r.price_usd, r.fx_rate, r.price_local, r.source_url
                );
            }
        }
    }
    Ok(())
}

pub fn format_summary(snapshot: &Snapshot) -> String {
    let mut out = format!(
        "{} fx USD/{} = {}\n",
        snapshot.date, snapshot.target_currency, snapshot.fx_rate
    );
    for row in &snapshot.rows {
        out.push_str(&format!(
            "  {:<8} {:>14.4} USD {:>16.4} {}\n",
            row.instrument_code, row.price_usd, row.price_local, snapshot.target_currency
        ));
    }
    out
}
