use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailstats pipeline.
#[derive(Error, Debug)]
pub enum MailStatsError {
    /// An input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output artifact could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row of the event log is structurally invalid.
    #[error("Malformed row at line {line}: {message}")]
    Format { line: u64, message: String },

    /// A derived value could not be computed (e.g. a division by zero).
    #[error("Computation error: {0}")]
    Computation(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for errors raised by the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the mailstats crates.
pub type Result<T> = std::result::Result<T, MailStatsError>;
