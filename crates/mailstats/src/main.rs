mod bootstrap;

use anyhow::{Context, Result};
use clap::Parser;
use mailstats_charts::{render_contact_chart, render_sending_chart};
use mailstats_core::settings::{OutputPaths, Settings};
use mailstats_data::aggregator::write_person_csv;
use mailstats_data::analysis::analyze_file;

fn main() -> Result<()> {
    let settings = Settings::parse();
    settings.validate()?;

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("mailstats v{} starting", env!("CARGO_PKG_VERSION"));

    let output = OutputPaths::new(settings.resolve_output_dir()?);
    bootstrap::ensure_output_dir(&output.dir)
        .with_context(|| format!("cannot prepare output directory {}", output.dir.display()))?;

    tracing::info!(
        "Input: {}, output: {}, top-n: {}, timezone: {}",
        settings.input.display(),
        output.dir.display(),
        settings.top_n,
        settings.timezone
    );

    let tz = settings.timezone_handler();
    let analysis = analyze_file(&settings.input, settings.top_n, &tz)
        .with_context(|| format!("failed to analyse {}", settings.input.display()))?;

    // The CSV is a complete artifact on its own; a later chart failure
    // leaves it in place.
    write_person_csv(&analysis.person_stats, &output.person_csv)?;
    println!(
        "csv file successfully saved, please check at {}",
        output.person_csv.display()
    );

    render_sending_chart(
        &analysis.weekly_sent,
        &analysis.weekly_averages,
        &output.sending_chart,
    )
    .context("failed to render weekly sending chart")?;
    println!(
        "figure successfully saved, please check at {}",
        output.sending_chart.display()
    );

    render_contact_chart(
        &analysis.weekly_contacts,
        &analysis.relative,
        &output.contact_chart,
    )
    .context("failed to render contact chart")?;
    println!(
        "figure successfully saved, please check at {}",
        output.contact_chart.display()
    );

    tracing::info!(
        "Done in {:.3}s (load {:.3}s)",
        analysis.metadata.load_time_seconds + analysis.metadata.transform_time_seconds,
        analysis.metadata.load_time_seconds
    );

    Ok(())
}
