//! Concrete adapter implementations for ports.

pub mod env_config_adapter;
pub mod file_config_adapter;
pub mod http_fetcher;
pub mod sqlite_adapter;
