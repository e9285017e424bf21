//! ### Convert
//! Writes the pipeline's tables out as flat csvs for the presentation
//! layer and for anyone poking at the data by hand.

use serde::Serialize;
use std::path::Path;

use crate::compute::{LoadDistribution, TemperatureCorrelation};
use crate::model::{DailyAggregate, UnifiedDataset};

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
pub struct HourlyCsvRow<'a> {
    #[serde(rename = "DateTime")]
    pub timestamp: String,
    #[serde(rename = "Location")]
    pub location: &'a str,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Weekday")]
    pub weekday: u32,
    #[serde(rename = "Hour")]
    pub hour: u32,
    #[serde(rename = "Load")]
    pub load: f64,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
}

#[derive(Serialize)]
pub struct DailyCsvRow<'a> {
    #[serde(rename = "DateTime")]
    pub date: String,
    #[serde(rename = "Location")]
    pub location: &'a str,
    // empty for days without data
    #[serde(rename = "Load")]
    pub load: Option<f64>,
}

pub fn write_hourly(output: &Path, dataset: &UnifiedDataset) -> anyhow::Result<()> {
    let mut out_csv = csv::Writer::from_path(output)?;
    for (timestamp, rec) in dataset.iter() {
        out_csv.serialize(HourlyCsvRow {
            timestamp: timestamp.format(TIMESTAMP_FMT).to_string(),
            location: &rec.location,
            year: rec.year,
            month: rec.month,
            day: rec.day,
            weekday: rec.weekday,
            hour: rec.hour,
            load: rec.load,
            temperature: rec.temperature,
        })?;
    }
    out_csv.flush()?;
    Ok(())
}

pub fn write_daily(output: &Path, daily: &DailyAggregate) -> anyhow::Result<()> {
    let mut out_csv = csv::Writer::from_path(output)?;
    for row in daily.iter() {
        out_csv.serialize(DailyCsvRow {
            date: row.date.format("%Y-%m-%d").to_string(),
            location: &row.location,
            load: row.load,
        })?;
    }
    out_csv.flush()?;
    Ok(())
}

pub fn write_load_distribution(output: &Path, stats: &[LoadDistribution]) -> anyhow::Result<()> {
    write_rows(output, stats)
}

pub fn write_temperature_correlation(
    output: &Path,
    corr: &[TemperatureCorrelation],
) -> anyhow::Result<()> {
    write_rows(output, corr)
}

fn write_rows<T: Serialize>(output: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut out_csv = csv::Writer::from_path(output)?;
    for row in rows {
        out_csv.serialize(row)?;
    }
    out_csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{daily_mean, load_distribution, Period};
    use crate::model::LocationRecord;

    fn dataset() -> UnifiedDataset {
        let records: Vec<LocationRecord> = [(1, 0, 10.), (1, 1, 20.), (3, 0, 30.)]
            .into_iter()
            .map(|(day, hour, load)| LocationRecord {
                location: "MIDATL".to_string(),
                year: 2015,
                month: 12,
                day,
                hour,
                weekday: 2,
                load,
                temperature: -1.5,
            })
            .collect();
        let index = records.iter().map(|r| r.timestamp().unwrap()).collect();
        UnifiedDataset::new(index, records)
    }

    #[test]
    fn hourly_csv_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("hourly.csv");
        write_hourly(&out, &dataset()).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("DateTime,Location,Year,Month,Day,Weekday,Hour,Load,Temperature")
        );
        assert_eq!(
            lines.next(),
            Some("2015-12-01 00:00:00,MIDATL,2015,12,1,2,0,10.0,-1.5")
        );
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn daily_csv_leaves_gaps_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("daily.csv");
        write_daily(&out, &daily_mean(&dataset())).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "DateTime,Location,Load",
                "2015-12-01,MIDATL,15.0",
                "2015-12-02,MIDATL,",
                "2015-12-03,MIDATL,30.0",
            ]
        );
    }

    #[test]
    fn stats_csv_has_a_header() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("stats.csv");
        write_load_distribution(&out, &load_distribution(&dataset(), Period::Hour)).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("location,bucket,count,min,q1,median,q3,max,mean\n"));
        assert_eq!(text.lines().count(), 3);
    }
}
