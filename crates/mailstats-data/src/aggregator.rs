//! Per-person sent/received aggregation and prolific-set selection.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use mailstats_core::error::{MailStatsError, Result};
use mailstats_core::models::{Event, ExpandedEvent, PersonStats};
use tracing::debug;

/// CSV header of the per-person aggregate.
pub const PERSON_CSV_HEADER: [&str; 3] = ["person", "sent", "received"];

// ── PersonTotals ──────────────────────────────────────────────────────────────

/// Column sums across all [`PersonStats`] rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonTotals {
    pub people: usize,
    pub sent: u64,
    pub received: u64,
}

// ── PersonAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that groups events by person.
pub struct PersonAggregator;

impl PersonAggregator {
    /// Distinct message ids per sender.
    pub fn count_sent(events: &[Event]) -> BTreeMap<String, u64> {
        count_distinct_messages(
            events
                .iter()
                .map(|e| (e.sender.as_str(), e.message_id.as_str())),
        )
    }

    /// Distinct message ids per recipient.
    pub fn count_received(expanded: &[ExpandedEvent]) -> BTreeMap<String, u64> {
        count_distinct_messages(
            expanded
                .iter()
                .map(|e| (e.recipient.as_str(), e.message_id.as_str())),
        )
    }

    /// Outer-join sent and received counts into one row per person.
    ///
    /// A person missing from one side gets `0` there. Rows are sorted
    /// ascending by `sent`, ties broken by `person` ascending.
    pub fn aggregate(events: &[Event], expanded: &[ExpandedEvent]) -> Vec<PersonStats> {
        let sent = Self::count_sent(events);
        let received = Self::count_received(expanded);

        let people: BTreeSet<&String> = sent.keys().chain(received.keys()).collect();

        let mut stats: Vec<PersonStats> = people
            .into_iter()
            .map(|person| PersonStats {
                person: person.clone(),
                sent: sent.get(person).copied().unwrap_or(0),
                received: received.get(person).copied().unwrap_or(0),
            })
            .collect();

        stats.sort_by(|a, b| a.sent.cmp(&b.sent).then_with(|| a.person.cmp(&b.person)));

        debug!(
            "Aggregated {} people ({} senders, {} recipients)",
            stats.len(),
            sent.len(),
            received.len()
        );
        stats
    }

    /// Sum the `sent` and `received` columns.
    pub fn calculate_totals(stats: &[PersonStats]) -> PersonTotals {
        let mut totals = PersonTotals::default();
        for row in stats {
            totals.people += 1;
            totals.sent += row.sent;
            totals.received += row.received;
        }
        totals
    }

    /// The `top_n` people with the highest sent count.
    ///
    /// `stats` must be in [`aggregate`](Self::aggregate) order. Only people
    /// who sent at least one message are eligible, so the result holds
    /// `min(top_n, distinct senders)` rows, still in ascending order.
    pub fn select_prolific(stats: &[PersonStats], top_n: usize) -> Vec<PersonStats> {
        let senders: Vec<&PersonStats> = stats.iter().filter(|s| s.sent > 0).collect();
        let start = senders.len().saturating_sub(top_n);
        senders[start..].iter().map(|s| (*s).clone()).collect()
    }
}

// ── CSV output ────────────────────────────────────────────────────────────────

/// Write the per-person aggregate to `path` as `person,sent,received`.
///
/// The header is always written, even for an empty aggregate. An existing
/// file is overwritten.
pub fn write_person_csv(stats: &[PersonStats], path: &Path) -> Result<()> {
    let write_err = |source: std::io::Error| MailStatsError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(write_err)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    wtr.write_record(PERSON_CSV_HEADER)?;
    for row in stats {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(write_err)?;

    debug!("Wrote {} rows to {}", stats.len(), path.display());
    Ok(())
}

// ── Private ───────────────────────────────────────────────────────────────────

/// Count distinct message ids per key.
fn count_distinct_messages<'a>(
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
) -> BTreeMap<String, u64> {
    let mut groups: HashMap<&str, HashSet<&str>> = HashMap::new();
    for (key, message_id) in pairs {
        groups.entry(key).or_default().insert(message_id);
    }
    groups
        .into_iter()
        .map(|(key, ids)| (key.to_string(), ids.len() as u64))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
