//! ### Assemble
//! Walks the data root, loads every location file against its directory's
//! calendar and builds the unified hourly table, its daily resample and
//! the location list.

use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::compute;
use crate::config::PipelineConfig;
use crate::error::{LoadError, LoadResult};
use crate::location::{load_location, Calendar, MeasurementTable};
use crate::model::{LoadedDataset, LocationRecord, LocationSet, UnifiedDataset};

/// A directory that directly holds CSV files, with those files sorted by
/// name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationDir {
    pub path: PathBuf,
    pub csv_files: Vec<String>,
}

/// Loads everything under `config.root`. Fails as a whole on the first
/// problem; nothing partial is returned.
pub fn assemble(config: &PipelineConfig) -> LoadResult<LoadedDataset> {
    let mut records = Vec::new();
    for dir in location_dirs(config.root())? {
        records.extend(load_directory(&dir, config)?);
    }
    if records.is_empty() {
        return Err(LoadError::NoLocationData {
            root: config.root.clone(),
        });
    }

    let hourly = index_records(records)?;
    let daily = compute::daily_mean(&hourly);
    let locations = LocationSet::from_dataset(&hourly);
    info!(
        "Assembled {} hourly rows and {} daily rows for {} locations from {}",
        hourly.len(),
        daily.len(),
        locations.len(),
        config.root.display()
    );

    Ok(LoadedDataset::new(hourly, daily, locations))
}

/// Every directory under (and including) `root` that directly holds at
/// least one CSV file, in file-name walk order.
pub fn location_dirs(root: &Path) -> LoadResult<Vec<LocationDir>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| LoadError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let mut csv_files = Vec::new();
        let listing = std::fs::read_dir(entry.path()).map_err(|source| LoadError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        for file in listing {
            let file = file.map_err(|source| LoadError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let path = file.path();
            if path.is_file() && is_csv(&path) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    csv_files.push(name.to_string());
                }
            }
        }

        if csv_files.is_empty() {
            continue;
        }
        csv_files.sort();
        dirs.push(LocationDir {
            path: entry.into_path(),
            csv_files,
        });
    }
    Ok(dirs)
}

/// Loads every location file of one directory, in file-name order.
pub fn load_directory(dir: &LocationDir, config: &PipelineConfig) -> LoadResult<Vec<LocationRecord>> {
    let Some(calendar_name) = dir.csv_files.iter().find(|f| config.is_calendar(f)) else {
        return Err(LoadError::MissingCalendarFile {
            dir: dir.path.clone(),
            calendar: config.calendar_file.clone(),
        });
    };
    let calendar = Calendar::read(&dir.path.join(calendar_name), config.base_year)?;
    info!(
        "Loading {} ({} calendar rows)",
        dir.path.display(),
        calendar.len()
    );

    let mut records = Vec::new();
    for file_name in dir.csv_files.iter().filter(|f| !config.is_reserved(f)) {
        let measurements = MeasurementTable::read(&dir.path.join(file_name))?;
        let location = load_location(&calendar, &measurements, file_name)?;
        debug!(
            "{file_name}: {} rows, load column '{}'",
            location.len(),
            measurements.schema.column()
        );
        records.extend(location);
    }
    Ok(records)
}

/// Builds the timestamp index. Every row needs a real timestamp and no
/// location may repeat one.
fn index_records(records: Vec<LocationRecord>) -> LoadResult<UnifiedDataset> {
    let mut index = Vec::with_capacity(records.len());
    let mut seen = HashSet::with_capacity(records.len());

    for rec in &records {
        let timestamp = rec.timestamp().ok_or_else(|| LoadError::MalformedTimestamp {
            location: rec.location.clone(),
            year: rec.year,
            month: rec.month,
            day: rec.day,
            hour: rec.hour,
        })?;
        if !seen.insert((rec.location.as_str(), timestamp)) {
            return Err(LoadError::DuplicateTimestamp {
                location: rec.location.clone(),
                timestamp,
            });
        }
        index.push(timestamp);
    }

    Ok(UnifiedDataset::new(index, records))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn midatl_new_year_scenario() {
        let tmp = tempfile::tempdir().unwrap();
        let site = tmp.path().join("l1");
        write(&site, "Date.csv", "Month,Day,Hour,Weekday\n12,31,23,4\n1,1,0,5\n");
        write(&site, "MIDATL.csv", "Demand,Temperature\n100,5.0\n110,6.0\n");

        let loaded = assemble(&PipelineConfig::new(tmp.path())).unwrap();
        let rows: Vec<_> = loaded.hourly().iter().collect();
        assert_eq!(rows.len(), 2);

        let (ts, rec) = rows[0];
        assert_eq!(ts.to_string(), "2015-12-31 23:00:00");
        assert_eq!((rec.year, rec.month, rec.day, rec.hour), (2015, 12, 31, 23));
        assert_eq!((rec.load, rec.temperature), (100., 5.0));

        let (ts, rec) = rows[1];
        assert_eq!(ts.to_string(), "2016-01-01 00:00:00");
        assert_eq!((rec.year, rec.month, rec.day, rec.hour), (2016, 1, 1, 0));
        assert_eq!((rec.load, rec.temperature), (110., 6.0));

        assert_eq!(loaded.locations().as_slice(), ["MIDATL".to_string()]);
    }

    #[test]
    fn reserved_and_non_csv_files_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "Date.csv", "Month,Day,Hour,Weekday\n1,1,0,4\n");
        write(tmp.path(), "WEST.csv", "Net,Temperature\n7,1\n");
        write(tmp.path(), "fcst.csv", "garbage\n");
        write(tmp.path(), "test.csv", "garbage\n");
        write(tmp.path(), "notes.txt", "not data\n");

        let loaded = assemble(&PipelineConfig::new(tmp.path())).unwrap();
        assert_eq!(loaded.hourly().len(), 1);
        assert_eq!(loaded.locations().as_slice(), ["WEST".to_string()]);
    }

    #[test]
    fn reserved_names_match_in_any_case() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "DATE.CSV", "Month,Day,Hour,Weekday\n1,1,0,4\n");
        write(tmp.path(), "SOUTH.csv", "Demand,Temperature\n3,1\n");
        write(tmp.path(), "FCST.CSV", "garbage\n");
        write(tmp.path(), "Test.csv", "garbage\n");

        let loaded = assemble(&PipelineConfig::new(tmp.path())).unwrap();
        assert_eq!(loaded.hourly().len(), 1);
        assert_eq!(loaded.locations().as_slice(), ["SOUTH".to_string()]);
    }

    #[test]
    fn directories_without_csv_files_are_not_locations() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("empty")).unwrap();
        write(&tmp.path().join("site"), "Date.csv", "Month,Day,Hour,Weekday\n1,1,0,4\n");

        let dirs = location_dirs(tmp.path()).unwrap();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].path, tmp.path().join("site"));
        assert_eq!(dirs[0].csv_files, ["Date.csv".to_string()]);
    }

    #[test]
    fn missing_calendar_aborts_the_load() {
        let tmp = tempfile::tempdir().unwrap();
        write(&tmp.path().join("a"), "Date.csv", "Month,Day,Hour,Weekday\n1,1,0,4\n");
        write(&tmp.path().join("a"), "SOUTH.csv", "Demand,Temperature\n1,2\n");
        write(&tmp.path().join("b"), "WEST.csv", "Demand,Temperature\n1,2\n");

        let err = assemble(&PipelineConfig::new(tmp.path())).unwrap_err();
        assert!(matches!(err, LoadError::MissingCalendarFile { dir, .. } if dir.ends_with("b")));
    }

    #[test]
    fn invalid_dates_are_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        // 2015 is not a leap year.
        write(tmp.path(), "Date.csv", "Month,Day,Hour,Weekday\n2,29,0,1\n");
        write(tmp.path(), "SOUTH.csv", "Demand,Temperature\n1,2\n");

        let err = assemble(&PipelineConfig::new(tmp.path())).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedTimestamp {
                year: 2015,
                month: 2,
                day: 29,
                ..
            }
        ));
    }

    #[test]
    fn repeated_timestamps_within_a_location_are_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "Date.csv", "Month,Day,Hour,Weekday\n1,1,0,4\n1,1,0,4\n");
        write(tmp.path(), "SOUTH.csv", "Demand,Temperature\n1,2\n3,4\n");

        let err = assemble(&PipelineConfig::new(tmp.path())).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateTimestamp { location, .. } if location == "SOUTH"));
    }

    #[test]
    fn nothing_to_load_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "Date.csv", "Month,Day,Hour,Weekday\n1,1,0,4\n");

        let err = assemble(&PipelineConfig::new(tmp.path())).unwrap_err();
        assert!(matches!(err, LoadError::NoLocationData { .. }));
    }
}
