//! Core domain types and logic.

pub mod config;
pub mod currency;
pub mod error;
pub mod instrument;
pub mod number;
pub mod payload;
pub mod price_resolver;
pub mod retry;
pub mod snapshot;
pub mod visible_text;
