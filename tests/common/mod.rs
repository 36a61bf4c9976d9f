#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use pricetl::domain::config::{HttpSettings, PipelineConfig};
use pricetl::domain::error::EtlError;
use pricetl::domain::instrument::Instrument;
use pricetl::domain::retry::RetryPolicy;
use pricetl::ports::fetch_port::FetchPort;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const GOLD_URL: &str = "https://quotes.example.com/gold";
pub const IRON_URL: &str = "https://quotes.example.com/iron-ore";
pub const COPPER_URL: &str = "https://quotes.example.com/copper";
pub const FX_URL: &str = "https://fx.example.com/latest/USD";

pub const GOLD_HTML: &str = r#"<html><head><title>Gold</title>
<script>window.chartYear = 2024;</script></head>
<body><h1>Gold</h1><div class="quote"><span>$4,340</span></div></body></html>"#;
pub const IRON_HTML: &str =
    "<html><body><h1>Iron Ore</h1><p>Iron ore rose to <b>106.05 USD/T</b></p></body></html>";
pub const COPPER_HTML: &str =
    "<html><body><h1>Copper</h1><table><tr><td>3.91 USD</td></tr></table></body></html>";

pub struct MockFetcher {
    pub pages: HashMap<String, String>,
    pub documents: HashMap<String, Value>,
    /// Number of upcoming calls that fail before the mock starts answering.
    pub failures_left: Cell<u32>,
    pub calls: RefCell<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            documents: HashMap::new(),
            failures_left: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_json(mut self, url: &str, doc: Value) -> Self {
        self.documents.insert(url.to_string(), doc);
        self
    }

    pub fn failing_first(self, n: u32) -> Self {
        self.failures_left.set(n);
        self
    }

    /// Gold, iron and copper pages plus an FX document quoting MRU at 36.5.
    pub fn standard() -> Self {
        Self::new()
            .with_page(GOLD_URL, GOLD_HTML)
            .with_page(IRON_URL, IRON_HTML)
            .with_page(COPPER_URL, COPPER_HTML)
            .with_json(FX_URL, json!({"base": "USD", "rates": {"MRU": 36.5, "EUR": 0.92}}))
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn record(&self, url: &str) -> Result<(), EtlError> {
        self.calls.borrow_mut().push(url.to_string());
        let left = self.failures_left.get();
        if left > 0 {
            self.failures_left.set(left - 1);
            return Err(EtlError::Fetch {
                url: url.to_string(),
                reason: "503 Service Unavailable".into(),
            });
        }
        Ok(())
    }
}

impl FetchPort for MockFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, EtlError> {
        self.record(url)?;
        self.pages.get(url).cloned().ok_or_else(|| EtlError::Fetch {
            url: url.to_string(),
            reason: "404 Not Found".into(),
        })
    }

    fn fetch_json(&self, url: &str) -> Result<Value, EtlError> {
        self.record(url)?;
        self.documents.get(url).cloned().ok_or_else(|| EtlError::Fetch {
            url: url.to_string(),
            reason: "404 Not Found".into(),
        })
    }
}

pub fn test_config(run_dir: &Path) -> PipelineConfig {
    PipelineConfig {
        instruments: vec![
            Instrument::new("GOLD", GOLD_URL),
            Instrument::new("IRON", IRON_URL),
            Instrument::new("COPPER", COPPER_URL),
        ],
        fx_url: FX_URL.to_string(),
        target_currency: "MRU".to_string(),
        run_dir: run_dir.to_path_buf(),
        sqlite_path: run_dir.join("etl.db"),
        sqlite_pool_size: 1,
        retry: RetryPolicy::new(3, Duration::ZERO),
        http: HttpSettings::default(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn source_ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()
}
