//! Environment variable configuration adapter and layered lookup.
//!
//! `[sources]` and `[paths]` keys map to the bare upper-cased key
//! (`gold_url` → `GOLD_URL`, `run_dir` → `RUN_DIR`); every other section is
//! prefixed (`[sqlite] path` → `SQLITE_PATH`).

use crate::ports::config_port::ConfigPort;
use std::collections::HashMap;

const UNPREFIXED_SECTIONS: &[&str] = &["sources", "paths"];

pub fn env_var_name(section: &str, key: &str) -> String {
    let section = section.to_lowercase();
    if UNPREFIXED_SECTIONS.contains(&section.as_str()) {
        key.to_uppercase()
    } else {
        format!("{}_{}", section.to_uppercase(), key.to_uppercase())
    }
}

/// Snapshot of environment variables taken once, at construction.
pub struct EnvConfigAdapter {
    vars: HashMap<String, String>,
}

impl EnvConfigAdapter {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigPort for EnvConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.vars
            .get(&env_var_name(section, key))
            .filter(|v| !v.is_empty())
            .cloned()
    }
}

/// Ordered stack of sources; the first layer holding a key wins.
#[derive(Default)]
pub struct LayeredConfig {
    layers: Vec<Box<dyn ConfigPort>>,
}

impl LayeredConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: impl ConfigPort + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl ConfigPort for LayeredConfig {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.layers
            .iter()
            .find_map(|layer| layer.get_string(section, key))
    }
}
