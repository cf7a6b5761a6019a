//! Data layer for mailstats.
//!
//! Loads the comma-delimited event log, fans multi-recipient events out,
//! aggregates per-person counts, selects the prolific set and buckets its
//! activity by calendar week.

pub mod aggregator;
pub mod analysis;
pub mod expander;
pub mod reader;
pub mod weekly;

pub use mailstats_core as core;
