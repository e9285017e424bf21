//! ### Model
//! Row and table types produced by the pipeline. The tables are built once
//! per load and only expose read access afterwards.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// One row of a location directory's calendar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CalendarRow {
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Hour")]
    pub hour: u32,
    #[serde(rename = "Weekday")]
    pub weekday: u32,
}

/// One row of a measurement file after schema normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementRow {
    pub load: f64,
    pub temperature: f64,
}

/// A single hour of one location: calendar fields, inferred year and the
/// normalized measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub location: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub weekday: u32,
    pub load: f64,
    pub temperature: f64,
}

impl LocationRecord {
    /// `None` when the calendar fields don't form a real date and hour.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(self.hour, 0, 0)
    }
}

/// Every location's records concatenated in load order, indexed by the
/// timestamp built from Year/Month/Day/Hour.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnifiedDataset {
    index: Vec<NaiveDateTime>,
    records: Vec<LocationRecord>,
}

impl UnifiedDataset {
    /// `index[i]` must be the timestamp of `records[i]`.
    pub(crate) fn new(index: Vec<NaiveDateTime>, records: Vec<LocationRecord>) -> Self {
        debug_assert_eq!(index.len(), records.len());
        Self { index, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, &LocationRecord)> {
        self.index.iter().copied().zip(self.records.iter())
    }

    pub fn for_location<'a>(
        &'a self,
        location: &'a str,
    ) -> impl Iterator<Item = (NaiveDateTime, &'a LocationRecord)> + 'a {
        self.iter().filter(move |(_, rec)| rec.location == location)
    }
}

/// Mean load of one location over one calendar day. `load` is `None` for a
/// day inside the location's range that has no hourly rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLoad {
    pub date: NaiveDate,
    pub location: String,
    pub load: Option<f64>,
}

/// Daily resample of the unified dataset, ordered by location then date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyAggregate {
    rows: Vec<DailyLoad>,
}

impl DailyAggregate {
    pub(crate) fn new(rows: Vec<DailyLoad>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[DailyLoad] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyLoad> {
        self.rows.iter()
    }

    pub fn get(&self, location: &str, date: NaiveDate) -> Option<&DailyLoad> {
        self.rows
            .iter()
            .find(|row| row.location == location && row.date == date)
    }
}

/// Distinct locations in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationSet {
    names: Vec<String>,
}

impl LocationSet {
    pub fn from_dataset(dataset: &UnifiedDataset) -> Self {
        let mut names: Vec<String> = Vec::new();
        for rec in dataset.records() {
            if !names.iter().any(|name| *name == rec.location) {
                names.push(rec.location.clone());
            }
        }
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.names.iter().any(|name| name == location)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

/// Everything one load produces.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    hourly: UnifiedDataset,
    daily: DailyAggregate,
    locations: LocationSet,
}

impl LoadedDataset {
    pub(crate) fn new(hourly: UnifiedDataset, daily: DailyAggregate, locations: LocationSet) -> Self {
        Self {
            hourly,
            daily,
            locations,
        }
    }

    pub fn hourly(&self) -> &UnifiedDataset {
        &self.hourly
    }

    pub fn daily(&self) -> &DailyAggregate {
        &self.daily
    }

    pub fn locations(&self) -> &LocationSet {
        &self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: &str, month: u32, day: u32, hour: u32) -> LocationRecord {
        LocationRecord {
            location: location.to_string(),
            year: 2015,
            month,
            day,
            hour,
            weekday: 1,
            load: 1.,
            temperature: 0.,
        }
    }

    #[test]
    fn timestamp_rejects_impossible_dates() {
        assert!(record("A", 2, 29, 0).timestamp().is_none());
        assert!(record("A", 1, 1, 24).timestamp().is_none());
        let ts = record("A", 12, 31, 23).timestamp().unwrap();
        assert_eq!(ts.to_string(), "2015-12-31 23:00:00");
    }

    #[test]
    fn location_set_is_distinct_in_first_seen_order() {
        let records = vec![
            record("WEST", 1, 1, 0),
            record("SOUTH", 1, 1, 0),
            record("WEST", 1, 1, 1),
        ];
        let index = records.iter().map(|r| r.timestamp().unwrap()).collect();
        let dataset = UnifiedDataset::new(index, records);

        let set = LocationSet::from_dataset(&dataset);
        assert_eq!(set.as_slice(), ["WEST".to_string(), "SOUTH".to_string()]);
        assert!(set.contains("SOUTH"));
        assert!(!set.contains("MIDATL"));
        assert_eq!(dataset.for_location("WEST").count(), 2);
    }
}
