use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::models::millis_to_utc;

/// `strftime` pattern for week labels: year, dash, Sunday-based week number.
///
/// Week `00` holds the days before the first Sunday of the year, so the
/// fixed-width labels sort chronologically as plain strings.
pub const WEEK_LABEL_FORMAT: &str = "%Y-%U";

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Converts event timestamps into calendar-week labels in a fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self { tz: Tz::UTC }
    }
}

impl TimezoneHandler {
    /// Create a handler for the given IANA timezone name.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// The configured timezone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Week label of a UTC instant, evaluated in the handler's timezone.
    pub fn week_label(&self, dt: DateTime<Utc>) -> String {
        dt.with_timezone(&self.tz)
            .format(WEEK_LABEL_FORMAT)
            .to_string()
    }

    /// Week label of an epoch-millisecond timestamp.
    ///
    /// Returns `None` when the timestamp is outside chrono's supported range.
    pub fn week_label_millis(&self, time_ms: i64) -> Option<String> {
        millis_to_utc(time_ms).map(|dt| self.week_label(dt))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
