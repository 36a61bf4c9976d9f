//! pricetl — daily commodity price snapshots in a local currency.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`pipeline`] sequences the
//! extract, transform and load stages.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod pipeline;
pub mod cli;
