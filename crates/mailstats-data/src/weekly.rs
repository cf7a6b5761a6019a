//! Calendar-week bucketing of the prolific set's activity.
//!
//! All series are keyed by `%Y-%U` week labels (see
//! [`mailstats_core::time_utils`]) and returned in label order, which is
//! chronological.

use std::collections::{BTreeMap, HashMap, HashSet};

use mailstats_core::error::{MailStatsError, Result};
use mailstats_core::models::{
    Event, ExpandedEvent, PersonStats, RelativeContactRatio, WeekCount, WeeklyAverage,
    WeeklyBucket,
};
use mailstats_core::time_utils::TimezoneHandler;
use tracing::{debug, warn};

/// Identifiers of the prolific set, for membership tests.
pub fn prolific_names(prolific: &[PersonStats]) -> HashSet<&str> {
    prolific.iter().map(|p| p.person.as_str()).collect()
}

/// Messages sent by prolific people, counted per week.
pub fn weekly_sent(
    events: &[Event],
    prolific: &HashSet<&str>,
    tz: &TimezoneHandler,
) -> Vec<WeekCount> {
    let mut weeks: BTreeMap<String, u64> = BTreeMap::new();

    for event in events {
        if !prolific.contains(event.sender.as_str()) {
            continue;
        }
        let Some(week) = week_of(tz, event.time_ms) else {
            continue;
        };
        *weeks.entry(week).or_insert(0) += 1;
    }

    debug!("Bucketed prolific sends into {} weeks", weeks.len());

    weeks
        .into_iter()
        .map(|(week, count)| WeekCount { week, count })
        .collect()
}

/// Distinct senders mailing a prolific person, per week, aligned with
/// `weekly_sent`.
///
/// Weeks that have contacts but no prolific sends are dropped.
pub fn weekly_unique_contacts(
    expanded: &[ExpandedEvent],
    prolific: &HashSet<&str>,
    weekly_sent: &[WeekCount],
    tz: &TimezoneHandler,
) -> Vec<WeeklyBucket> {
    let mut contacts: BTreeMap<String, HashSet<&str>> = BTreeMap::new();

    for row in expanded {
        if !prolific.contains(row.recipient.as_str()) {
            continue;
        }
        let Some(week) = week_of(tz, row.time_ms) else {
            continue;
        };
        contacts.entry(week).or_default().insert(row.sender.as_str());
    }

    let sent_by_week: HashMap<&str, u64> = weekly_sent
        .iter()
        .map(|w| (w.week.as_str(), w.count))
        .collect();

    let total_weeks = contacts.len();
    let buckets: Vec<WeeklyBucket> = contacts
        .into_iter()
        .filter_map(|(week, senders)| {
            let sent = *sent_by_week.get(week.as_str())?;
            Some(WeeklyBucket {
                unique_contacts: senders.len() as u64,
                sent,
                week,
            })
        })
        .collect();

    if buckets.len() < total_weeks {
        debug!(
            "Dropped {} contact weeks without prolific sends",
            total_weeks - buckets.len()
        );
    }
    buckets
}

/// Distinct senders per prolific recipient divided by that person's own
/// sent total.
///
/// Rows are ordered by person. Fails with
/// [`MailStatsError::Computation`] when a contacted person has sent nothing.
pub fn relative_contact_ratios(
    expanded: &[ExpandedEvent],
    prolific: &HashSet<&str>,
    stats: &[PersonStats],
) -> Result<Vec<RelativeContactRatio>> {
    let mut senders_by_person: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for row in expanded {
        if prolific.contains(row.recipient.as_str()) {
            senders_by_person
                .entry(row.recipient.as_str())
                .or_default()
                .insert(row.sender.as_str());
        }
    }

    let sent_by_person: HashMap<&str, u64> =
        stats.iter().map(|s| (s.person.as_str(), s.sent)).collect();

    senders_by_person
        .into_iter()
        .map(|(person, senders)| {
            let sent = sent_by_person.get(person).copied().unwrap_or(0);
            if sent == 0 {
                return Err(MailStatsError::Computation(format!(
                    "relative contact ratio for \"{}\" is undefined: no sent messages",
                    person
                )));
            }
            let unique_senders = senders.len() as u64;
            Ok(RelativeContactRatio {
                person: person.to_string(),
                unique_senders,
                sent,
                relative: unique_senders as f64 / sent as f64,
            })
        })
        .collect()
}

/// Each prolific person's sent total divided by the number of weeks in
/// `weekly_sent`, in prolific-set order.
pub fn weekly_averages(prolific: &[PersonStats], weeks: usize) -> Vec<WeeklyAverage> {
    if weeks == 0 {
        return Vec::new();
    }
    prolific
        .iter()
        .map(|p| WeeklyAverage {
            person: p.person.clone(),
            average: p.sent as f64 / weeks as f64,
        })
        .collect()
}

fn week_of(tz: &TimezoneHandler, time_ms: i64) -> Option<String> {
    let week = tz.week_label_millis(time_ms);
    if week.is_none() {
        warn!("Skipping event with out-of-range time {}", time_ms);
    }
    week
}

// ── Tests ─────────────────────────────────────────────────────────────────────
