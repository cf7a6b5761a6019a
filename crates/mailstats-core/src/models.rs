use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One row of the event log: a single email send action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Send time as milliseconds since the Unix epoch.
    pub time_ms: i64,
    /// Unique message identifier.
    pub message_id: String,
    /// Identifier of the sending person.
    pub sender: String,
    /// Raw pipe-delimited recipients field, kept verbatim.
    pub recipients: String,
    /// Free-form topic column.
    #[serde(default)]
    pub topic: String,
    /// Free-form mode column.
    #[serde(default)]
    pub mode: String,
}

impl Event {
    /// UTC timestamp of the send.
    ///
    /// The loader rejects out-of-range times, so this only falls back to the
    /// epoch for events constructed by hand with an invalid `time_ms`.
    pub fn timestamp(&self) -> DateTime<Utc> {
        millis_to_utc(self.time_ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// A single (message, recipient) pair derived from an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedEvent {
    pub time_ms: i64,
    pub message_id: String,
    pub sender: String,
    /// Exactly one recipient identifier (may be empty).
    pub recipient: String,
}

/// Per-person sent/received totals. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonStats {
    pub person: String,
    pub sent: u64,
    pub received: u64,
}

/// Messages sent by the prolific set in one calendar week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekCount {
    /// Week label in `%Y-%U` form, e.g. `"2001-05"`.
    pub week: String,
    pub count: u64,
}

/// Weekly unique-contact count aligned with the weekly sent count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub week: String,
    /// Distinct senders who mailed a prolific person during the week.
    pub unique_contacts: u64,
    /// Messages sent by the prolific set during the week.
    pub sent: u64,
}

/// Contact breadth of one prolific person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeContactRatio {
    pub person: String,
    /// Distinct senders that addressed this person.
    pub unique_senders: u64,
    /// This person's own sent total.
    pub sent: u64,
    /// `unique_senders / sent`.
    pub relative: f64,
}

/// A prolific person's total sent spread over the observed weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAverage {
    pub person: String,
    pub average: f64,
}

/// Convert epoch milliseconds into a UTC [`DateTime`].
///
/// Returns `None` when the value lies outside chrono's supported range.
pub fn millis_to_utc(time_ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(time_ms).single()
}
