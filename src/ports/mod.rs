//! Port traits: configuration, source fetching and price storage.

pub mod config_port;
pub mod fetch_port;
pub mod price_port;
