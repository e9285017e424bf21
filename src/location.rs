//! ### Location
//! Turns one location's measurement file plus its directory's calendar
//! file into annotated hourly records.

use csv::StringRecord;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult};
use crate::model::{CalendarRow, LocationRecord, MeasurementRow};
use crate::year::infer_years;

const TEMPERATURE: &str = "Temperature";

/// A directory's calendar rows together with the years inferred for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    rows: Vec<CalendarRow>,
    years: Vec<i32>,
}

impl Calendar {
    const COLUMNS: [&'static str; 4] = ["Month", "Day", "Hour", "Weekday"];

    /// The year counter lives only for this call, so every calendar gets
    /// its own independent count starting at `base_year`.
    pub fn from_rows(rows: Vec<CalendarRow>, base_year: i32) -> Self {
        let months: Vec<u32> = rows.iter().map(|row| row.month).collect();
        let years = infer_years(&months, base_year);
        Self { rows, years }
    }

    pub fn read(path: &Path, base_year: i32) -> LoadResult<Self> {
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path, base_year)
    }

    pub fn from_reader(reader: impl io::Read, source: &Path, base_year: i32) -> LoadResult<Self> {
        let mut reader = csv_reader(reader);
        let headers = normalized_headers(&mut reader, source)?;
        for column in Self::COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(LoadError::MissingColumn {
                    file: source.to_path_buf(),
                    column: column.to_string(),
                });
            }
        }

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<CalendarRow>, _>>()
            .map_err(|e| csv_error(source, e))?;
        Ok(Self::from_rows(rows, base_year))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CalendarRow] {
        &self.rows
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }
}

/// The column names a measurement file may use for the load quantity. Both
/// map onto the canonical `Load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementSchema {
    Demand,
    Net,
}

impl MeasurementSchema {
    /// In priority order: a file carrying both is read as `Demand`.
    pub const ALL: [MeasurementSchema; 2] = [MeasurementSchema::Demand, MeasurementSchema::Net];

    pub fn column(self) -> &'static str {
        match self {
            MeasurementSchema::Demand => "Demand",
            MeasurementSchema::Net => "Net",
        }
    }

    pub fn detect(headers: &StringRecord) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|schema| headers.iter().any(|h| h == schema.column()))
    }
}

/// A measurement file with its quantity column already renamed to `Load`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTable {
    pub source: PathBuf,
    pub schema: MeasurementSchema,
    pub rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    pub fn read(path: &Path) -> LoadResult<Self> {
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }

    pub fn from_reader(reader: impl io::Read, source: &Path) -> LoadResult<Self> {
        let mut reader = csv_reader(reader);
        let headers = normalized_headers(&mut reader, source)?;
        let header_map: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name, idx))
            .collect();

        let (schema, load_idx) = MeasurementSchema::detect(&headers)
            .and_then(|schema| Some((schema, *header_map.get(schema.column())?)))
            .ok_or_else(|| LoadError::UnrecognizedMeasurementSchema {
                file: source.to_path_buf(),
            })?;
        let temperature_idx =
            *header_map
                .get(TEMPERATURE)
                .ok_or_else(|| LoadError::MissingColumn {
                    file: source.to_path_buf(),
                    column: TEMPERATURE.to_string(),
                })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(source, e))?;
            rows.push(MeasurementRow {
                load: parse_cell(&record, load_idx, schema.column(), source)?,
                temperature: parse_cell(&record, temperature_idx, TEMPERATURE, source)?,
            });
        }

        Ok(Self {
            source: source.to_path_buf(),
            schema,
            rows,
        })
    }
}

/// The location identifier is the file name up to its first dot.
pub fn location_id(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Joins a calendar with one location's measurements, row by row.
///
/// The output has exactly one record per calendar row, in calendar order.
pub fn load_location(
    calendar: &Calendar,
    measurements: &MeasurementTable,
    file_name: &str,
) -> LoadResult<Vec<LocationRecord>> {
    if calendar.len() != measurements.rows.len() {
        return Err(LoadError::RowCountMismatch {
            file: measurements.source.clone(),
            calendar: calendar.len(),
            measurements: measurements.rows.len(),
        });
    }

    let location = location_id(file_name);
    Ok(calendar
        .rows
        .iter()
        .zip(&calendar.years)
        .zip(&measurements.rows)
        .map(|((cal, &year), meas)| LocationRecord {
            location: location.to_string(),
            year,
            month: cal.month,
            day: cal.day,
            hour: cal.hour,
            weekday: cal.weekday,
            load: meas.load,
            temperature: meas.temperature,
        })
        .collect())
}

fn csv_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Reads the header row, strips whitespace and a leading BOM, and installs
/// the cleaned names back on the reader so serde lookups match.
fn normalized_headers<R: io::Read>(
    reader: &mut csv::Reader<R>,
    source: &Path,
) -> LoadResult<StringRecord> {
    let headers: StringRecord = reader
        .headers()
        .map_err(|e| csv_error(source, e))?
        .iter()
        .map(|name| name.trim().trim_start_matches('\u{feff}').trim())
        .collect();
    reader.set_headers(headers.clone());
    Ok(headers)
}

fn parse_cell(record: &StringRecord, idx: usize, column: &str, source: &Path) -> LoadResult<f64> {
    let value = record.get(idx).unwrap_or("");
    // NaN and infinities parse as f64 but are not measurements.
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LoadError::InvalidNumber {
            file: source.to_path_buf(),
            line: record.position().map_or(0, |pos| pos.line()),
            column: column.to_string(),
            value: value.to_string(),
        })
}

fn csv_error(source: &Path, err: csv::Error) -> LoadError {
    LoadError::Csv {
        path: source.to_path_buf(),
        source: err,
    }
}
