//! Chart rendering for mailstats.
//!
//! Turns the weekly series and per-person ratios produced by
//! `mailstats-data` into two multi-panel PNG images.

pub mod charts;
pub mod histogram;

pub use charts::{render_contact_chart, render_sending_chart, PlotError};
