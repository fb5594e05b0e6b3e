//! Human-readable rendering of a [`QualityReport`].

use chrono::NaiveDateTime;

use crate::analyzers::quality::{MAX_PLAUSIBLE_TEMP_F, MIN_PLAUSIBLE_TEMP_F};
use crate::analyzers::types::{Correlation, GroupMean, Heatmap, QualityReport};
use crate::records::CombinedRecord;

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

fn record_table(records: &[CombinedRecord]) -> String {
    let mut table = format!(
        "{:<12} {:<20} {:>8} {:>8} {:>12} {:<10}\n",
        "date", "city", "tmax_f", "tmin_f", "energy_mwh", "day_of_week"
    );
    for r in records {
        table.push_str(&format!(
            "{:<12} {:<20} {:>8} {:>8} {:>12.1} {:<10}\n",
            r.date.to_string(),
            r.city,
            fmt_opt(r.tmax_f),
            fmt_opt(r.tmin_f),
            r.energy_mwh,
            r.day_of_week
        ));
    }
    table
}

/// Renders the report with sections in fixed order: freshness, missing
/// values, outliers, join coverage.
pub fn render(report: &QualityReport, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();

    out.push_str("=====================================\n");
    out.push_str("    Data Quality Report\n");
    out.push_str("=====================================\n");
    out.push_str(&format!(
        "Report generated on: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Total records: {}\n\n", report.total_records));

    out.push_str("--- 1. Data Freshness ---\n");
    match &report.freshness {
        Some(f) => {
            out.push_str(&format!("Latest data point found: {}\n", f.latest_date));
            out.push_str(&format!("Days since latest data: {}\n\n", f.days_since_latest));
        }
        None => out.push_str("No dated records found.\n\n"),
    }

    out.push_str("--- 2. Missing Values ---\n");
    if report.missing_values.is_empty() {
        out.push_str("No missing values found.\n\n");
    } else {
        out.push_str(&format!(
            "{:<14} {:>13} {:>15}\n",
            "column", "missing_count", "missing_percent"
        ));
        for m in &report.missing_values {
            out.push_str(&format!("{:<14} {:>13} {:>15.2}\n", m.column, m.count, m.percent));
        }
        out.push('\n');
    }

    out.push_str("--- 3. Outliers ---\n");
    if report.outliers.is_empty() {
        out.push_str("No outliers found.\n\n");
    } else {
        if !report.outliers.temperature.is_empty() {
            out.push_str(&format!(
                "Temperature Outliers (TMAX/TMIN > {MAX_PLAUSIBLE_TEMP_F}F or < {MIN_PLAUSIBLE_TEMP_F}F):\n"
            ));
            out.push_str(&record_table(&report.outliers.temperature));
            out.push('\n');
        }
        if !report.outliers.energy.is_empty() {
            out.push_str("Energy Outliers (Negative Consumption):\n");
            out.push_str(&record_table(&report.outliers.energy));
            out.push('\n');
        }
    }

    out.push_str("--- 4. Join Coverage ---\n");
    if report.join_coverage.is_empty() {
        out.push_str("No join coverage recorded.\n");
    } else {
        out.push_str(&format!(
            "{:<20} {:>12} {:>11} {:>8} {:>12} {:>11} {:>9}\n",
            "city", "weather_days", "demand_days", "matched", "weather_only", "demand_only", "matched%"
        ));
        for c in &report.join_coverage {
            out.push_str(&format!(
                "{:<20} {:>12} {:>11} {:>8} {:>12} {:>11} {:>9.1}\n",
                c.city,
                c.weather_days,
                c.demand_days,
                c.matched_days,
                c.weather_only,
                c.demand_only,
                c.matched_pct()
            ));
        }
    }

    out
}

/// Plain-text summary of the pattern analysis.
pub fn render_patterns(
    correlation: Option<Correlation>,
    weekly: &[GroupMean],
    seasonal: &[GroupMean],
    heatmap: &Heatmap,
) -> String {
    let mut out = String::new();

    out.push_str("--- Correlation Analysis ---\n");
    match correlation {
        Some(c) => {
            out.push_str(&format!(
                "Overall Temperature vs. Energy Correlation: {:.4}\n",
                c.r
            ));
            out.push_str(&format!("R-squared: {:.4} (n = {})\n", c.r_squared, c.samples));
        }
        None => out.push_str("Not enough data for a correlation.\n"),
    }

    for (title, groups) in [
        ("Weekday vs. Weekend Analysis", weekly),
        ("Seasonal Analysis", seasonal),
    ] {
        out.push_str(&format!("\n--- {title} ---\n"));
        for g in groups {
            out.push_str(&format!(
                "{:<10} mean {:>12.1} MWh  stddev {:>10.1}  days {:>4}\n",
                g.label, g.mean_energy_mwh, g.stddev_energy_mwh, g.days
            ));
        }
    }

    out.push_str("\n--- Demand by Temperature and Weekday (mean MWh) ---\n");
    out.push_str(&format!("{:<9}", ""));
    for day in &heatmap.weekdays {
        out.push_str(&format!(" {:>10}", &day[..3]));
    }
    out.push('\n');
    for (band, row) in heatmap.bands.iter().zip(&heatmap.cells) {
        out.push_str(&format!("{band:<9}"));
        for cell in row {
            out.push_str(&format!(" {:>10}", fmt_opt(*cell)));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::quality::analyze;
    use crate::join::JoinCoverage;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 2, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    fn record(day: u32, tmax: Option<f64>, energy: f64) -> CombinedRecord {
        CombinedRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            tmax_f: tmax,
            tmin_f: Some(40.0),
            energy_mwh: energy,
            city: "Seattle".into(),
            day_of_week: "Sunday".into(),
        }
    }

    #[test]
    fn test_clean_report_sections_in_order() {
        let report = analyze(&[record(1, Some(50.0), 10.0)], NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        let text = render(&report, generated_at());

        let positions: Vec<usize> = [
            "--- 1. Data Freshness ---",
            "--- 2. Missing Values ---",
            "--- 3. Outliers ---",
            "--- 4. Join Coverage ---",
        ]
        .iter()
        .map(|h| text.find(h).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(text.contains("Report generated on: 2023-02-01 08:30:00"));
        assert!(text.contains("Latest data point found: 2023-01-01"));
        assert!(text.contains("Days since latest data: 2"));
        assert!(text.contains("No missing values found."));
        assert!(text.contains("No outliers found."));
    }

    #[test]
    fn test_problem_rows_are_listed() {
        let records = vec![record(1, None, 10.0), record(2, Some(140.0), -3.0)];
        let report = analyze(&records, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap())
            .with_join_coverage(vec![JoinCoverage {
                city: "Seattle".into(),
                weather_days: 3,
                demand_days: 2,
                matched_days: 2,
                weather_only: 1,
                demand_only: 0,
            }]);
        let text = render(&report, generated_at());

        assert!(text.contains("tmax_f"));
        assert!(text.contains("50.00"));
        assert!(text.contains("Temperature Outliers"));
        assert!(text.contains("Energy Outliers (Negative Consumption):"));
        assert!(text.contains("140.0"));
        assert!(text.contains("66.7"));
    }
}
