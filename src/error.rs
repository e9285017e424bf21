//! ### Error
//! Every way a load can fail. Any of these aborts the whole load; there is
//! no partial dataset.

use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("location directory '{}' has no calendar file '{calendar}'", dir.display())]
    MissingCalendarFile { dir: PathBuf, calendar: String },

    #[error("'{}' has neither a 'Demand' nor a 'Net' column", file.display())]
    UnrecognizedMeasurementSchema { file: PathBuf },

    #[error("'{}' is missing the '{column}' column", file.display())]
    MissingColumn { file: PathBuf, column: String },

    #[error("'{}' has {measurements} rows but its calendar has {calendar}", file.display())]
    RowCountMismatch {
        file: PathBuf,
        calendar: usize,
        measurements: usize,
    },

    #[error("{location}: {year}-{month:02}-{day:02} hour {hour} is not a valid timestamp")]
    MalformedTimestamp {
        location: String,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
    },

    #[error("{location}: timestamp {timestamp} appears more than once")]
    DuplicateTimestamp {
        location: String,
        timestamp: NaiveDateTime,
    },

    #[error("'{}' line {line}: '{value}' in column '{column}' is not a number", file.display())]
    InvalidNumber {
        file: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    #[error("no location data found under '{}'", root.display())]
    NoLocationData { root: PathBuf },

    #[error("failed to read CSV '{}'", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk '{}'", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;
