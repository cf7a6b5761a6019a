//! Fan-out of multi-recipient events into one row per recipient.

use mailstats_core::models::{Event, ExpandedEvent};

/// Separator between recipient identifiers in the raw field.
pub const RECIPIENT_SEPARATOR: char = '|';

/// Split a raw recipients field into identifiers.
///
/// The field as a whole is trimmed first; individual tokens are kept as-is,
/// so an empty field yields a single empty identifier.
pub fn split_recipients(recipients: &str) -> Vec<&str> {
    recipients.trim().split(RECIPIENT_SEPARATOR).collect()
}

/// Expand every event into one [`ExpandedEvent`] per recipient.
///
/// Output order is input row order, then recipient order within the row.
pub fn expand_recipients(events: &[Event]) -> Vec<ExpandedEvent> {
    events
        .iter()
        .flat_map(|event| {
            split_recipients(&event.recipients)
                .into_iter()
                .map(move |recipient| ExpandedEvent {
                    time_ms: event.time_ms,
                    message_id: event.message_id.clone(),
                    sender: event.sender.clone(),
                    recipient: recipient.to_string(),
                })
        })
        .collect()
}
