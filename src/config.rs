//! ### Config
//! Where the raw data lives and how it is laid out.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Directory walked for location-data subdirectories.
    pub root: PathBuf,
    /// Absolute year assigned to the first calendar row of every location.
    pub base_year: i32,
    /// Name of the per-directory calendar file.
    pub calendar_file: String,
    /// Files that sit next to the measurements but are not locations
    /// (forecast and held-out test extracts).
    pub excluded_files: Vec<String>,
}

impl PipelineConfig {
    pub const DEFAULT_BASE_YEAR: i32 = 2015;
    pub const DEFAULT_CALENDAR_FILE: &'static str = "Date.csv";
    pub const DEFAULT_EXCLUDED_FILES: [&'static str; 2] = ["fcst.csv", "test.csv"];

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_year: Self::DEFAULT_BASE_YEAR,
            calendar_file: Self::DEFAULT_CALENDAR_FILE.to_string(),
            excluded_files: Self::DEFAULT_EXCLUDED_FILES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    pub fn with_base_year(mut self, base_year: i32) -> Self {
        self.base_year = base_year;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names are compared ignoring ASCII case, matching how `.csv`
    /// extensions are recognized.
    pub fn is_calendar(&self, file_name: &str) -> bool {
        file_name.eq_ignore_ascii_case(&self.calendar_file)
    }

    /// True for the calendar file and the reserved non-location files.
    pub fn is_reserved(&self, file_name: &str) -> bool {
        self.is_calendar(file_name)
            || self
                .excluded_files
                .iter()
                .any(|f| f.eq_ignore_ascii_case(file_name))
    }
}
