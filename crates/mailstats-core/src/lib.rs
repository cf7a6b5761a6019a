//! Shared building blocks for mailstats.
//!
//! Domain models for email events and their derived views, the error type,
//! command-line settings and week-label time utilities.

pub mod error;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{MailStatsError, Result};
