//! ### Compute
//! Views derived from the unified hourly dataset: the daily resample plus
//! the per-month / per-hour load statistics shown next to the time series.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{DailyAggregate, DailyLoad, LocationRecord, UnifiedDataset};

/// Calendar field used to bucket hourly rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month,
    Hour,
}

impl Period {
    pub fn bucket(self, rec: &LocationRecord) -> u32 {
        match self {
            Period::Month => rec.month,
            Period::Hour => rec.hour,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Month => "Month",
            Period::Hour => "Hour",
        }
    }
}

/// Mean load per location per calendar day. Every day between a location's
/// first and last observation gets a row; days with no hourly rows have no
/// load.
pub fn daily_mean(dataset: &UnifiedDataset) -> DailyAggregate {
    let mut by_location: BTreeMap<&str, BTreeMap<NaiveDate, (f64, usize)>> = BTreeMap::new();
    for (timestamp, rec) in dataset.iter() {
        let (sum, count) = by_location
            .entry(rec.location.as_str())
            .or_default()
            .entry(timestamp.date())
            .or_insert((0., 0));
        *sum += rec.load;
        *count += 1;
    }

    let mut rows = Vec::new();
    for (location, days) in by_location {
        let (Some((&first, _)), Some((&last, _))) = (days.first_key_value(), days.last_key_value())
        else {
            continue;
        };
        for date in first.iter_days().take_while(|date| *date <= last) {
            rows.push(DailyLoad {
                date,
                location: location.to_string(),
                load: days.get(&date).map(|&(sum, count)| sum / count as f64),
            });
        }
    }

    DailyAggregate::new(rows)
}

/// Box-plot statistics of load for one location and bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadDistribution {
    pub location: String,
    pub bucket: u32,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

pub fn load_distribution(dataset: &UnifiedDataset, period: Period) -> Vec<LoadDistribution> {
    let mut groups: BTreeMap<(&str, u32), Vec<f64>> = BTreeMap::new();
    for rec in dataset.records() {
        groups
            .entry((rec.location.as_str(), period.bucket(rec)))
            .or_default()
            .push(rec.load);
    }

    groups
        .into_iter()
        .map(|((location, bucket), mut loads)| {
            loads.sort_by(f64::total_cmp);
            let count = loads.len();
            LoadDistribution {
                location: location.to_string(),
                bucket,
                count,
                min: loads[0],
                q1: quantile(&loads, 0.25),
                median: quantile(&loads, 0.5),
                q3: quantile(&loads, 0.75),
                max: loads[count - 1],
                mean: loads.iter().sum::<f64>() / count as f64,
            }
        })
        .collect()
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// How load tracks temperature for one location and bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureCorrelation {
    pub location: String,
    pub bucket: u32,
    pub count: usize,
    /// Pearson r; absent with fewer than two rows or a constant series.
    pub pearson: Option<f64>,
    /// Least-squares slope of load on temperature.
    pub slope: Option<f64>,
}

#[derive(Default)]
struct Moments {
    n: usize,
    sum_t: f64,
    sum_l: f64,
    sum_tt: f64,
    sum_ll: f64,
    sum_tl: f64,
}

pub fn temperature_correlation(
    dataset: &UnifiedDataset,
    period: Period,
) -> Vec<TemperatureCorrelation> {
    let mut groups: BTreeMap<(&str, u32), Moments> = BTreeMap::new();
    for rec in dataset.records() {
        let m = groups
            .entry((rec.location.as_str(), period.bucket(rec)))
            .or_default();
        m.n += 1;
        m.sum_t += rec.temperature;
        m.sum_l += rec.load;
        m.sum_tt += rec.temperature * rec.temperature;
        m.sum_ll += rec.load * rec.load;
        m.sum_tl += rec.temperature * rec.load;
    }

    groups
        .into_iter()
        .map(|((location, bucket), m)| {
            let n = m.n as f64;
            let cov = m.sum_tl - m.sum_t * m.sum_l / n;
            let var_t = m.sum_tt - m.sum_t * m.sum_t / n;
            let var_l = m.sum_ll - m.sum_l * m.sum_l / n;
            let defined = m.n >= 2;
            TemperatureCorrelation {
                location: location.to_string(),
                bucket,
                count: m.n,
                pearson: (defined && var_t > 0. && var_l > 0.)
                    .then(|| (cov / (var_t * var_l).sqrt()).clamp(-1., 1.)),
                slope: (defined && var_t > 0.).then(|| cov / var_t),
            }
        })
        .collect()
}
