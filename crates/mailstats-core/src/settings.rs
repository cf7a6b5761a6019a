use clap::Parser;
use std::path::{Path, PathBuf};

use crate::error::{MailStatsError, Result};
use crate::time_utils::TimezoneHandler;

/// File name of the per-person aggregate.
pub const PERSON_CSV_FILE: &str = "person-sent-received.csv";
/// File name of the weekly-sending chart.
pub const SENDING_CHART_FILE: &str = "Visualization (2).png";
/// File name of the contact-breadth chart.
pub const CONTACT_CHART_FILE: &str = "Visualization (3).png";

/// Size of the prolific set when none is given.
pub const DEFAULT_TOP_N: usize = 100;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Summarise an email event log into per-person counts and weekly charts
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mailstats",
    about = "Summarise an email event log into per-person counts and weekly charts",
    version
)]
pub struct Settings {
    /// Comma-delimited event log: time,message_id,sender,recipients,topic,mode
    pub input: PathBuf,

    /// Directory receiving the CSV and chart images
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of most prolific senders to chart
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// IANA timezone used for weekly bucketing
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse an explicit argument list, enabling unit-testing without
    /// spawning subprocesses.
    pub fn from_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args)
    }

    /// Check the values clap cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(MailStatsError::Config(
                "top-n must be at least 1".to_string(),
            ));
        }
        if !TimezoneHandler::validate_timezone(&self.timezone) {
            return Err(MailStatsError::Config(format!(
                "unrecognised timezone \"{}\"",
                self.timezone
            )));
        }
        Ok(())
    }

    /// The effective log level; `--debug` overrides `--log-level`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    /// Timezone handler for the configured `--timezone`.
    pub fn timezone_handler(&self) -> TimezoneHandler {
        TimezoneHandler::new(&self.timezone)
    }

    /// Absolute form of `--output-dir`, resolved against `cwd` when relative.
    pub fn resolve_output_dir_in(&self, cwd: &Path) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else if self.output_dir == Path::new(".") {
            cwd.to_path_buf()
        } else {
            cwd.join(&self.output_dir)
        }
    }

    /// Absolute form of `--output-dir`, resolved against the process's
    /// current working directory.
    pub fn resolve_output_dir(&self) -> Result<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| {
            MailStatsError::Config(format!("cannot determine working directory: {}", e))
        })?;
        Ok(self.resolve_output_dir_in(&cwd))
    }
}

// ── OutputPaths ────────────────────────────────────────────────────────────────

/// Locations of the three artifacts a run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dir: PathBuf,
    pub person_csv: PathBuf,
    pub sending_chart: PathBuf,
    pub contact_chart: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            person_csv: dir.join(PERSON_CSV_FILE),
            sending_chart: dir.join(SENDING_CHART_FILE),
            contact_chart: dir.join(CONTACT_CHART_FILE),
            dir,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
