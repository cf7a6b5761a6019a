//! Multi-panel PNG charts of the prolific set's sending behaviour.
//!
//! Both charts are drawn with the [`plotters`] bitmap backend. Week series
//! use integer x positions and only every n-th week carries a label, so long
//! ranges stay readable.

use std::path::Path;

use mailstats_core::models::{RelativeContactRatio, WeekCount, WeeklyAverage, WeeklyBucket};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use thiserror::Error;
use tracing::debug;

use crate::histogram::{histogram, DEFAULT_BINS};

/// Pixel size of the weekly-sending chart.
pub const SENDING_CHART_SIZE: (u32, u32) = (2400, 1600);
/// Pixel size of the contact-breadth chart.
pub const CONTACT_CHART_SIZE: (u32, u32) = (2400, 800);

/// Label every n-th week on the sending line panel.
const SENDING_LABEL_STEP: usize = 25;
/// Label every n-th week on the contacts line panel.
const CONTACT_LABEL_STEP: usize = 10;

const WEEK_AXIS_DESC: &str = "weeks (format of %Y-%U)";

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save chart to {path}: {message}")]
    Save { path: String, message: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Draw the weekly-sending chart and save it to `output_path`.
///
/// * top left: prolific sends per week;
/// * top right: histogram of per-person weekly averages;
/// * bottom: each prolific person's weekly average.
pub fn render_sending_chart(
    weekly_sent: &[WeekCount],
    averages: &[WeeklyAverage],
    output_path: &Path,
) -> Result<()> {
    ensure_finite(averages.iter().map(|a| a.average), "weekly average")?;

    let root = BitMapBackend::new(output_path, SENDING_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let (upper, lower) = root.split_vertically(SENDING_CHART_SIZE.1 / 2);
    let (top_left, top_right) = upper.split_horizontally(SENDING_CHART_SIZE.0 / 2);

    let weeks: Vec<&str> = weekly_sent.iter().map(|w| w.week.as_str()).collect();
    let counts: Vec<f64> = weekly_sent.iter().map(|w| w.count as f64).collect();
    draw_week_lines(
        &top_left,
        "weekly sent over time (the most prolific individuals)",
        "number of weekly sent",
        &weeks,
        &[("weekly sent", counts.as_slice(), BLUE)],
        SENDING_LABEL_STEP,
    )?;

    let values: Vec<f64> = averages.iter().map(|a| a.average).collect();
    draw_histogram(
        &top_right,
        "Distribution of average weekly sent (among the most prolific individuals)",
        "number of average weekly sent by one individual",
        &values,
    )?;

    draw_person_bars(
        &lower,
        "Number of individual's weekly average sent",
        averages,
    )?;

    root.present().map_err(|e| PlotError::Save {
        path: output_path.display().to_string(),
        message: e.to_string(),
    })?;

    debug!(
        "Rendered sending chart: {} weeks, {} people",
        weekly_sent.len(),
        averages.len()
    );
    Ok(())
}

/// Draw the contact-breadth chart and save it to `output_path`.
///
/// * left: weekly unique contacts and weekly sent over the aligned weeks;
/// * right: histogram of the relative contact ratio.
pub fn render_contact_chart(
    weekly_contacts: &[WeeklyBucket],
    relative: &[RelativeContactRatio],
    output_path: &Path,
) -> Result<()> {
    ensure_finite(relative.iter().map(|r| r.relative), "relative number")?;

    let root = BitMapBackend::new(output_path, CONTACT_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let (left, right) = root.split_horizontally(CONTACT_CHART_SIZE.0 / 2);

    let weeks: Vec<&str> = weekly_contacts.iter().map(|b| b.week.as_str()).collect();
    let contacts: Vec<f64> = weekly_contacts
        .iter()
        .map(|b| b.unique_contacts as f64)
        .collect();
    let sent: Vec<f64> = weekly_contacts.iter().map(|b| b.sent as f64).collect();
    draw_week_lines(
        &left,
        "sending and unique contacts over time (among the most prolific individuals)",
        "number of emails sent/received",
        &weeks,
        &[
            ("weekly unique contacts", contacts.as_slice(), BLUE),
            ("weekly sent", sent.as_slice(), RED),
        ],
        CONTACT_LABEL_STEP,
    )?;

    let values: Vec<f64> = relative.iter().map(|r| r.relative).collect();
    draw_histogram(
        &right,
        "Distribution of relative number (unique contacts over number of sending)",
        "relative number",
        &values,
    )?;

    root.present().map_err(|e| PlotError::Save {
        path: output_path.display().to_string(),
        message: e.to_string(),
    })?;

    debug!(
        "Rendered contact chart: {} weeks, {} people",
        weekly_contacts.len(),
        relative.len()
    );
    Ok(())
}

/// The label shown under x position `index`: the week label for every
/// `step`-th position, empty otherwise.
pub fn sparse_label(labels: &[&str], index: i32, step: usize) -> String {
    if index < 0 || step == 0 {
        return String::new();
    }
    let index = index as usize;
    if index % step != 0 {
        return String::new();
    }
    labels.get(index).map(|s| s.to_string()).unwrap_or_default()
}

/// Upper bound for a y axis holding `values`, with some headroom.
pub fn y_upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

// ── Panels ────────────────────────────────────────────────────────────────────

/// One or more line series over a shared week axis.
fn draw_week_lines(
    area: &Area<'_>,
    title: &str,
    y_desc: &str,
    weeks: &[&str],
    series: &[(&str, &[f64], RGBColor)],
    label_step: usize,
) -> Result<()> {
    let x_end = weeks.len().max(1) as i32;
    let y_max = y_upper_bound(series.iter().flat_map(|(_, values, _)| values.iter().copied()));

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(110)
        .y_label_area_size(80)
        .build_cartesian_2d(0..x_end, 0f64..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let x_fmt = |x: &i32| sparse_label(weeks, *x, label_step);
    chart
        .configure_mesh()
        .x_labels(weeks.len() + 1)
        .x_label_formatter(&x_fmt)
        .x_label_style(
            ("sans-serif", 16)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_desc(WEEK_AXIS_DESC)
        .y_desc(y_desc)
        .disable_x_mesh()
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (name, values, color) in series {
        let color = *color;
        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(i, v)| (i as i32, *v)),
                &color,
            ))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    if series.len() > 1 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    Ok(())
}

/// A 30-bin histogram of `values`.
fn draw_histogram(area: &Area<'_>, title: &str, x_desc: &str, values: &[f64]) -> Result<()> {
    let bins = histogram(values, DEFAULT_BINS);
    let x_range = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => first.start..last.end,
        _ => 0.0..1.0,
    };
    let y_max = y_upper_bound(bins.iter().map(|b| b.count as f64));

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, 0f64..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("frequency / count")
        .x_label_formatter(&|x: &f64| format!("{:.2}", x))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new(
                [(b.start, 0.0), (b.end, b.count as f64)],
                BLUE.mix(0.6).filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// One bar per prolific person, labelled with the person identifier.
fn draw_person_bars(area: &Area<'_>, title: &str, averages: &[WeeklyAverage]) -> Result<()> {
    let names: Vec<&str> = averages.iter().map(|a| a.person.as_str()).collect();
    let x_end = averages.len().max(1) as u32;
    let y_max = y_upper_bound(averages.iter().map(|a| a.average));

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(220)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..x_end).into_segmented(), 0f64..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let x_fmt = |x: &SegmentValue<u32>| match x {
        SegmentValue::CenterOf(i) => names
            .get(*i as usize)
            .map(|s| s.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .x_labels(names.len() + 1)
        .x_label_formatter(&x_fmt)
        .x_label_style(
            ("sans-serif", 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_desc("individuals")
        .y_desc("number of weekly average sent")
        .disable_x_mesh()
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(averages.iter().enumerate().map(|(i, a)| {
            let i = i as u32;
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), a.average),
                ],
                BLUE.filled(),
            );
            bar.set_margin(0, 0, 2, 2);
            bar
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

fn ensure_finite(values: impl Iterator<Item = f64>, what: &str) -> Result<()> {
    for value in values {
        if !value.is_finite() {
            return Err(PlotError::InvalidData(format!(
                "{} {} is not a finite number",
                what, value
            )));
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn week(week: &str, count: u64) -> WeekCount {
        WeekCount {
            week: week.to_string(),
            count,
        }
    }

    fn average(person: &str, average: f64) -> WeeklyAverage {
        WeeklyAverage {
            person: person.to_string(),
            average,
        }
    }

    #[test]
    fn test_sparse_label_every_step() {
        let labels = ["2001-00", "2001-01", "2001-02", "2001-03", "2001-04"];
        assert_eq!(sparse_label(&labels, 0, 2), "2001-00");
        assert_eq!(sparse_label(&labels, 1, 2), "");
        assert_eq!(sparse_label(&labels, 2, 2), "2001-02");
        assert_eq!(sparse_label(&labels, 4, 2), "2001-04");
    }

    #[test]
    fn test_sparse_label_out_of_range() {
        let labels = ["2001-00", "2001-01"];
        assert_eq!(sparse_label(&labels, -1, 1), "");
        assert_eq!(sparse_label(&labels, 10, 1), "");
        assert_eq!(sparse_label(&labels, 0, 0), "");
    }

    #[test]
    fn test_y_upper_bound() {
        assert_eq!(y_upper_bound([].into_iter()), 1.0);
        assert_eq!(y_upper_bound([0.0, 0.0].into_iter()), 1.0);
        assert!((y_upper_bound([2.0, 10.0, 4.0].into_iter()) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_rejects_non_finite_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.png");

        let result = render_sending_chart(&[], &[average("a", f64::NAN)], &path);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));

        let ratio = RelativeContactRatio {
            person: "a".to_string(),
            unique_senders: 1,
            sent: 0,
            relative: f64::INFINITY,
        };
        let result = render_contact_chart(&[], &[ratio], &path);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
        assert!(!path.exists());
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_render_sending_chart_writes_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Visualization (2).png");
        let weeks: Vec<WeekCount> = (0..60)
            .map(|i| week(&format!("2001-{:02}", i % 53), (i * 7 % 13) as u64))
            .collect();
        let averages = vec![average("alice", 1.5), average("bob", 4.0)];

        render_sending_chart(&weeks, &averages, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_render_contact_chart_writes_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Visualization (3).png");
        let buckets = vec![
            WeeklyBucket {
                week: "2001-01".to_string(),
                unique_contacts: 3,
                sent: 5,
            },
            WeeklyBucket {
                week: "2001-02".to_string(),
                unique_contacts: 2,
                sent: 1,
            },
        ];
        let ratios = vec![RelativeContactRatio {
            person: "alice".to_string(),
            unique_senders: 3,
            sent: 2,
            relative: 1.5,
        }];

        render_contact_chart(&buckets, &ratios, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_render_empty_series() {
        let dir = TempDir::new().unwrap();
        let sending = dir.path().join("sending.png");
        let contact = dir.path().join("contact.png");

        render_sending_chart(&[], &[], &sending).unwrap();
        render_contact_chart(&[], &[], &contact).unwrap();
        assert!(sending.exists());
        assert!(contact.exists());
    }
}
