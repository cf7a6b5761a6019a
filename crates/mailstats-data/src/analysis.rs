//! Main analysis pipeline for mailstats.
//!
//! Orchestrates loading, recipient expansion, per-person aggregation,
//! prolific-set selection and weekly bucketing, returning an
//! [`AnalysisResult`] ready for CSV output and chart rendering.

use std::path::Path;

use chrono::Utc;
use mailstats_core::error::Result;
use mailstats_core::models::{
    Event, PersonStats, RelativeContactRatio, WeekCount, WeeklyAverage, WeeklyBucket,
};
use mailstats_core::time_utils::TimezoneHandler;
use tracing::info;

use crate::aggregator::PersonAggregator;
use crate::expander::expand_recipients;
use crate::reader::load_events;
use crate::weekly::{
    prolific_names, relative_contact_ratios, weekly_averages, weekly_sent,
    weekly_unique_contacts,
};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of [`Event`] rows processed.
    pub events_processed: usize,
    /// Number of (message, recipient) rows after expansion.
    pub expanded_rows: usize,
    /// Distinct people in the per-person aggregate.
    pub people: usize,
    /// Size of the prolific set.
    pub prolific: usize,
    /// Weeks in which the prolific set sent mail.
    pub weeks: usize,
    /// Wall-clock seconds spent reading the event log.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent on expansion, aggregation and bucketing.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_events`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Every person, ascending by `sent` (ties by person).
    pub person_stats: Vec<PersonStats>,
    /// The most prolific senders, ascending by `sent`.
    pub prolific: Vec<PersonStats>,
    /// Prolific sends per week.
    pub weekly_sent: Vec<WeekCount>,
    /// Weekly unique contacts aligned with `weekly_sent`.
    pub weekly_contacts: Vec<WeeklyBucket>,
    /// Contact breadth per contacted prolific person.
    pub relative: Vec<RelativeContactRatio>,
    /// Weekly average sent per prolific person.
    pub weekly_averages: Vec<WeeklyAverage>,
    /// Metadata about this analysis run.
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Load the event log at `path` and run [`analyze_events`] on it.
pub fn analyze_file(path: &Path, top_n: usize, tz: &TimezoneHandler) -> Result<AnalysisResult> {
    let load_start = std::time::Instant::now();
    let events = load_events(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let mut result = analyze_events(&events, top_n, tz)?;
    result.metadata.load_time_seconds = load_time;
    Ok(result)
}

/// Run the full analysis pipeline over loaded events.
///
/// 1. Expand recipients.
/// 2. Aggregate per-person sent/received counts.
/// 3. Select the `top_n` most prolific senders.
/// 4. Bucket their activity by week and compute contact ratios.
pub fn analyze_events(
    events: &[Event],
    top_n: usize,
    tz: &TimezoneHandler,
) -> Result<AnalysisResult> {
    let transform_start = std::time::Instant::now();

    // ── Step 1: Expand ────────────────────────────────────────────────────────
    let expanded = expand_recipients(events);

    // ── Step 2: Aggregate ─────────────────────────────────────────────────────
    let person_stats = PersonAggregator::aggregate(events, &expanded);

    // ── Step 3: Prolific set ──────────────────────────────────────────────────
    let prolific = PersonAggregator::select_prolific(&person_stats, top_n);
    let names = prolific_names(&prolific);

    // ── Step 4: Weekly buckets ────────────────────────────────────────────────
    let sent_series = weekly_sent(events, &names, tz);
    let weekly_contacts = weekly_unique_contacts(&expanded, &names, &sent_series, tz);
    let relative = relative_contact_ratios(&expanded, &names, &person_stats)?;
    let averages = weekly_averages(&prolific, sent_series.len());

    let transform_time = transform_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        events_processed: events.len(),
        expanded_rows: expanded.len(),
        people: person_stats.len(),
        prolific: prolific.len(),
        weeks: sent_series.len(),
        load_time_seconds: 0.0,
        transform_time_seconds: transform_time,
    };

    info!(
        "Analysed {} events ({} recipient rows): {} people, {} prolific, {} weeks",
        metadata.events_processed,
        metadata.expanded_rows,
        metadata.people,
        metadata.prolific,
        metadata.weeks
    );

    Ok(AnalysisResult {
        person_stats,
        prolific,
        weekly_sent: sent_series,
        weekly_contacts,
        relative,
        weekly_averages: averages,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mailstats_core::error::MailStatsError;
    use std::io::Write;
    use tempfile::TempDir;

    const WEEK_MS: i64 = 7 * 86_400_000;
    /// 2001-01-07T09:00:00Z, a Sunday.
    const BASE_MS: i64 = 978_858_000_000;

    fn write_log(dir: &Path, name: &str, lines: &[String]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn sample_lines() -> Vec<String> {
        vec![
            format!("{},m1,A,B|C,Budget,email", BASE_MS),
            format!("{},m2,B,A,Re: Budget,email", BASE_MS + 3_600_000),
            format!("{},m3,A,B,Lunch,email", BASE_MS + WEEK_MS),
        ]
    }

    // ── analyze_file ──────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_file_end_to_end() {
        let dir = TempDir::new().unwrap();
        let path = write_log(dir.path(), "events.csv", &sample_lines());

        let result = analyze_file(&path, 100, &TimezoneHandler::default()).unwrap();

        let rows: Vec<(&str, u64, u64)> = result
            .person_stats
            .iter()
            .map(|s| (s.person.as_str(), s.sent, s.received))
            .collect();
        assert_eq!(rows, vec![("C", 0, 1), ("B", 1, 2), ("A", 2, 1)]);

        // C never sent anything, so only A and B are prolific.
        let prolific: Vec<&str> = result.prolific.iter().map(|s| s.person.as_str()).collect();
        assert_eq!(prolific, vec!["B", "A"]);

        let weeks: Vec<(&str, u64)> = result
            .weekly_sent
            .iter()
            .map(|w| (w.week.as_str(), w.count))
            .collect();
        assert_eq!(weeks, vec![("2001-01", 2), ("2001-02", 1)]);

        // Week 01: B<-A, A<-B => {A, B}. Week 02: B<-A => {A}.
        let contacts: Vec<(&str, u64, u64)> = result
            .weekly_contacts
            .iter()
            .map(|b| (b.week.as_str(), b.unique_contacts, b.sent))
            .collect();
        assert_eq!(contacts, vec![("2001-01", 2, 2), ("2001-02", 1, 1)]);

        // A: contacted by {B}, sent 2. B: contacted by {A}, sent 1.
        assert_eq!(result.relative.len(), 2);
        assert_eq!(result.relative[0].person, "A");
        assert!((result.relative[0].relative - 0.5).abs() < 1e-12);
        assert!((result.relative[1].relative - 1.0).abs() < 1e-12);

        assert_eq!(result.weekly_averages.len(), 2);
        assert_eq!(result.weekly_averages[1].person, "A");
        assert!((result.weekly_averages[1].average - 1.0).abs() < 1e-12);

        assert_eq!(result.metadata.events_processed, 3);
        assert_eq!(result.metadata.expanded_rows, 4);
        assert_eq!(result.metadata.people, 3);
        assert_eq!(result.metadata.prolific, 2);
        assert_eq!(result.metadata.weeks, 2);
        assert!(result.metadata.load_time_seconds >= 0.0);
    }

    #[test]
    fn test_analyze_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = analyze_file(
            &dir.path().join("nope.csv"),
            100,
            &TimezoneHandler::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MailStatsError::FileRead { .. }));
    }

    #[test]
    fn test_analyze_file_malformed_row_aborts() {
        let dir = TempDir::new().unwrap();
        let mut lines = sample_lines();
        lines.push("not-a-time,m4,A,B,t,email".to_string());
        let path = write_log(dir.path(), "events.csv", &lines);

        let err = analyze_file(&path, 100, &TimezoneHandler::default()).unwrap_err();
        assert!(matches!(err, MailStatsError::Format { line: 4, .. }));
    }

    // ── analyze_events ────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_events_respects_top_n() {
        let dir = TempDir::new().unwrap();
        let path = write_log(dir.path(), "events.csv", &sample_lines());
        let events = load_events(&path).unwrap();

        let result = analyze_events(&events, 1, &TimezoneHandler::default()).unwrap();
        assert_eq!(result.prolific.len(), 1);
        assert_eq!(result.prolific[0].person, "A");
        // Only A's sends are bucketed now.
        let total: u64 = result.weekly_sent.iter().map(|w| w.count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_analyze_events_empty() {
        let result = analyze_events(&[], 100, &TimezoneHandler::default()).unwrap();
        assert!(result.person_stats.is_empty());
        assert!(result.prolific.is_empty());
        assert!(result.weekly_sent.is_empty());
        assert!(result.weekly_contacts.is_empty());
        assert!(result.relative.is_empty());
        assert!(result.weekly_averages.is_empty());
    }
}
