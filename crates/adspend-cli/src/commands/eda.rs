//! `adspend eda`: clean a dataset and summarise it without training.

use crate::error::Result;
use crate::output;
use adspend::data::read_csv;
use adspend::eda::EdaReport;
use std::path::Path;

pub(crate) fn run(input: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    super::require_file(input)?;
    let config = super::load_config(config)?;
    let raw = read_csv(input)?;
    let report = EdaReport::from_raw(&raw, &config.channels, &config.target)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Console rendering shared with `adspend run`.
pub(crate) fn print_report(report: &EdaReport) {
    output::section("Data Cleaning");
    output::kv("Rows read", report.cleaning.rows_in);
    output::kv("Duplicates removed", report.cleaning.duplicates_removed);
    output::kv("Incomplete rows removed", report.cleaning.incomplete_removed);
    output::kv("Rows kept", report.cleaning.rows_out());

    output::section("Descriptive Statistics");
    println!(
        "  {} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        output::pad("column", 12),
        "count",
        "mean",
        "std",
        "min",
        "median",
        "max"
    );
    for stats in &report.describe {
        println!(
            "  {} {:>10} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            output::pad(&stats.name, 12),
            stats.count,
            stats.mean,
            stats.std,
            stats.min,
            stats.median,
            stats.max
        );
    }

    output::section("Correlation Matrix");
    let header: String = report
        .correlation
        .names
        .iter()
        .map(|name| format!(" {name:>10}"))
        .collect();
    println!("  {}{header}", output::pad("", 12));
    for (name, row) in report.correlation.names.iter().zip(&report.correlation.values) {
        let cells: String = row.iter().map(|r| format!(" {r:>10.3}")).collect();
        println!("  {}{cells}", output::pad(name, 12));
    }

    output::section("Channel Trends");
    for trend in &report.trends {
        output::kv(
            &trend.channel,
            format!(
                "slope={:.4}, intercept={:.4}, R²={:.4}",
                trend.slope, trend.intercept, trend.r_squared
            ),
        );
    }
}
