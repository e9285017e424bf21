use clap::Parser;
use log::info;
use pjm_load::{
    compute::{self, Period},
    convert,
    graph::Graphing,
    store, DatasetCache, LoadedDataset, PipelineConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(clap::Args, Debug)]
struct Source {
    /// Root of the location-data directories, e.g. data/l1. Each directory
    /// holding csvs needs a Date.csv calendar next to the location files.
    data_root: PathBuf,

    /// Year assigned to the first calendar row.
    #[clap(long, default_value_t = PipelineConfig::DEFAULT_BASE_YEAR)]
    base_year: i32,
}

impl Source {
    fn load(&self) -> anyhow::Result<Arc<LoadedDataset>> {
        let config = PipelineConfig::new(&self.data_root).with_base_year(self.base_year);
        Ok(DatasetCache::global().load(&config)?)
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum GroupBy {
    Month,
    Hour,
}

impl From<GroupBy> for Period {
    fn from(group: GroupBy) -> Self {
        match group {
            GroupBy::Month => Period::Month,
            GroupBy::Hour => Period::Hour,
        }
    }
}

#[derive(clap::Parser, Debug)]
enum Args {
    /// Loads the data root and prints what was found.
    // cargo run summary data/l1
    Summary {
        #[clap(flatten)]
        source: Source,
    },

    /// Writes the unified hourly table.
    // cargo run write-hourly data/l1 results/hourly.csv
    WriteHourly {
        #[clap(flatten)]
        source: Source,

        /// Where the output csv will be written
        csv_out: PathBuf,
    },

    /// Writes the per-location daily mean load.
    // cargo run write-daily data/l1 results/daily.csv
    WriteDaily {
        #[clap(flatten)]
        source: Source,

        /// Where the output csv will be written
        csv_out: PathBuf,
    },

    /// Writes load quartiles per location by month or by hour of day.
    // cargo run write-load-stats data/l1 results/load_by_hour.csv --by hour
    WriteLoadStats {
        #[clap(flatten)]
        source: Source,

        /// Where the output csv will be written
        csv_out: PathBuf,

        #[clap(long, value_enum, default_value_t = GroupBy::Month)]
        by: GroupBy,
    },

    /// Writes the temperature/load correlation per location by month or
    /// by hour of day.
    // cargo run write-correlation data/l1 results/corr_by_month.csv
    WriteCorrelation {
        #[clap(flatten)]
        source: Source,

        /// Where the output csv will be written
        csv_out: PathBuf,

        #[clap(long, value_enum, default_value_t = GroupBy::Month)]
        by: GroupBy,
    },

    /// Renders the daily mean load of every location as a png.
    // cargo run graph-daily data/l1 results/daily.png
    GraphDaily {
        #[clap(flatten)]
        source: Source,

        /// Where the output PNG file will be written.
        output_png: PathBuf,
    },

    /// Writes the hourly, daily and location tables into a SQLite file.
    // cargo run export-sqlite data/l1 results/load.sqlite
    ExportSqlite {
        #[clap(flatten)]
        source: Source,

        /// SQLite database file; existing tables are replaced.
        db: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Args::parse() {
        Args::Summary { source } => {
            let loaded = source.load()?;
            let hourly = loaded.hourly();
            println!("{} hourly rows, {} daily rows", hourly.len(), loaded.daily().len());
            for location in loaded.locations().iter() {
                let index: Vec<_> = hourly.for_location(location).map(|(ts, _)| ts).collect();
                if let (Some(first), Some(last)) = (index.iter().min(), index.iter().max()) {
                    println!("  {location}: {} rows, {first} to {last}", index.len());
                }
            }
        }
        Args::WriteHourly { source, csv_out } => {
            let loaded = source.load()?;
            convert::write_hourly(&csv_out, loaded.hourly())?;
            info!("Wrote {}", csv_out.display());
        }
        Args::WriteDaily { source, csv_out } => {
            let loaded = source.load()?;
            convert::write_daily(&csv_out, loaded.daily())?;
            info!("Wrote {}", csv_out.display());
        }
        Args::WriteLoadStats {
            source,
            csv_out,
            by,
        } => {
            let loaded = source.load()?;
            let stats = compute::load_distribution(loaded.hourly(), by.into());
            convert::write_load_distribution(&csv_out, &stats)?;
            info!("Wrote {}", csv_out.display());
        }
        Args::WriteCorrelation {
            source,
            csv_out,
            by,
        } => {
            let loaded = source.load()?;
            let corr = compute::temperature_correlation(loaded.hourly(), by.into());
            convert::write_temperature_correlation(&csv_out, &corr)?;
            info!("Wrote {}", csv_out.display());
        }
        Args::GraphDaily { source, output_png } => {
            let loaded = source.load()?;
            Graphing::new(&output_png).daily_load(loaded.daily(), loaded.locations())?;
            info!("Wrote {}", output_png.display());
        }
        Args::ExportSqlite { source, db } => {
            let loaded = source.load()?;
            store::export_sqlite(&db, &loaded)?;
            info!("Wrote {}", db.display());
        }
    }
    Ok(())
}
