//! Temperature/demand relationships across the combined dataset.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::analyzers::types::{Correlation, GroupMean, Heatmap};
use crate::analyzers::utility::{mean, stddev};
use crate::records::CombinedRecord;

pub const TEMPERATURE_BANDS: [&str; 6] = ["<50°F", "50-60°F", "60-70°F", "70-80°F", "80-90°F", ">90°F"];

/// Lower edges of the bands after the first, each band left-closed.
const BAND_EDGES: [f64; 5] = [50.0, 60.0, 70.0, 80.0, 90.0];

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

fn band_index(temp_f: f64) -> usize {
    BAND_EDGES.iter().take_while(|&&edge| temp_f >= edge).count()
}

fn group_mean(label: &str, values: &[f64]) -> GroupMean {
    let m = mean(values);
    GroupMean {
        label: label.to_string(),
        mean_energy_mwh: m,
        stddev_energy_mwh: stddev(values, m),
        days: values.len(),
    }
}

/// Pearson r between average temperature and demand over rows with both.
///
/// `None` with fewer than two usable rows or when either side is constant.
pub fn temperature_energy_correlation(records: &[CombinedRecord]) -> Option<Correlation> {
    let pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| Some((r.temp_avg_f()?, r.energy_mwh)))
        .filter(|(t, e)| t.is_finite() && e.is_finite())
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let temps: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let energy: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    let (mt, me) = (mean(&temps), mean(&energy));

    let covariance: f64 = pairs.iter().map(|(t, e)| (t - mt) * (e - me)).sum();
    let var_t: f64 = temps.iter().map(|t| (t - mt).powi(2)).sum();
    let var_e: f64 = energy.iter().map(|e| (e - me).powi(2)).sum();

    if var_t == 0.0 || var_e == 0.0 {
        return None;
    }

    let r = covariance / (var_t.sqrt() * var_e.sqrt());
    Some(Correlation {
        r,
        r_squared: r * r,
        samples: pairs.len(),
    })
}

/// Mean demand on weekdays versus Saturday/Sunday. Groups with no days are left out.
pub fn weekday_vs_weekend(records: &[CombinedRecord]) -> Vec<GroupMean> {
    let (weekend, weekday): (Vec<&CombinedRecord>, Vec<&CombinedRecord>) = records
        .iter()
        .partition(|r| matches!(r.date.weekday(), Weekday::Sat | Weekday::Sun));

    [("Weekday", weekday), ("Weekend", weekend)]
        .into_iter()
        .filter(|(_, rows)| !rows.is_empty())
        .map(|(label, rows)| {
            let values: Vec<f64> = rows.iter().map(|r| r.energy_mwh).collect();
            group_mean(label, &values)
        })
        .collect()
}

/// Mean demand per meteorological season, Winter first.
pub fn seasonal_demand(records: &[CombinedRecord]) -> Vec<GroupMean> {
    let mut by_season: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for r in records {
        by_season
            .entry(Season::from_month(r.date.month()))
            .or_default()
            .push(r.energy_mwh);
    }

    by_season
        .into_iter()
        .map(|(season, values)| group_mean(season.as_str(), &values))
        .collect()
}

/// Mean demand per (temperature band, weekday) cell.
pub fn demand_heatmap(records: &[CombinedRecord]) -> Heatmap {
    let mut sums = [[(0.0f64, 0usize); 7]; 6];

    for r in records {
        let Some(temp) = r.temp_avg_f() else {
            continue;
        };
        let band = band_index(temp);
        let day = r.date.weekday().num_days_from_monday() as usize;
        let cell = &mut sums[band][day];
        cell.0 += r.energy_mwh;
        cell.1 += 1;
    }

    Heatmap {
        bands: TEMPERATURE_BANDS.to_vec(),
        weekdays: WEEK
            .iter()
            .filter_map(|&d| NaiveDate::from_isoywd_opt(2024, 1, d))
            .map(|date| date.format("%A").to_string())
            .collect(),
        cells: sums
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&(sum, n)| (n > 0).then(|| sum / n as f64))
                    .collect()
            })
            .collect(),
    }
}
