//! ### Store
//! Dumps a loaded dataset into a SQLite file so dashboards can query it
//! without going through the csv pipeline again. Each export replaces the
//! previous tables wholesale.

use rusqlite::{params, Connection};
use std::path::Path;

use crate::model::LoadedDataset;

const SCHEMA: &str = "
    DROP TABLE IF EXISTS hourly_load;
    DROP TABLE IF EXISTS daily_load;
    DROP TABLE IF EXISTS locations;
    CREATE TABLE hourly_load (
        datetime    TEXT NOT NULL,
        location    TEXT NOT NULL,
        year        INTEGER NOT NULL,
        month       INTEGER NOT NULL,
        day         INTEGER NOT NULL,
        weekday     INTEGER NOT NULL,
        hour        INTEGER NOT NULL,
        load        REAL NOT NULL,
        temperature REAL NOT NULL,
        PRIMARY KEY (location, datetime)
    );
    CREATE TABLE daily_load (
        date     TEXT NOT NULL,
        location TEXT NOT NULL,
        load     REAL,
        PRIMARY KEY (location, date)
    );
    CREATE TABLE locations (
        location TEXT PRIMARY KEY
    );
";

pub fn export_sqlite(path: &Path, dataset: &LoadedDataset) -> anyhow::Result<()> {
    let mut conn = Connection::open(path)?;
    write_dataset(&mut conn, dataset)
}

pub fn write_dataset(conn: &mut Connection, dataset: &LoadedDataset) -> anyhow::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO hourly_load
                (datetime, location, year, month, day, weekday, hour, load, temperature)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for (timestamp, rec) in dataset.hourly().iter() {
            insert.execute(params![
                timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                rec.location,
                rec.year,
                rec.month,
                rec.day,
                rec.weekday,
                rec.hour,
                rec.load,
                rec.temperature,
            ])?;
        }

        let mut insert =
            tx.prepare("INSERT INTO daily_load (date, location, load) VALUES (?1, ?2, ?3)")?;
        for row in dataset.daily().iter() {
            insert.execute(params![
                row.date.format("%Y-%m-%d").to_string(),
                row.location,
                row.load
            ])?;
        }

        let mut insert = tx.prepare("INSERT INTO locations (location) VALUES (?1)")?;
        for location in dataset.locations().iter() {
            insert.execute(params![location])?;
        }
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use crate::config::PipelineConfig;
    use std::fs;

    fn loaded() -> LoadedDataset {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("Date.csv"),
            "Month,Day,Hour,Weekday\n12,31,22,4\n12,31,23,4\n1,1,0,5\n",
        )
        .unwrap();
        fs::write(tmp.path().join("MIDATL.csv"), "Demand,Temperature\n90,4\n100,5\n110,6\n").unwrap();
        fs::write(tmp.path().join("WEST.csv"), "Net,Temperature\n1,4\n2,5\n3,6\n").unwrap();
        assemble(&PipelineConfig::new(tmp.path())).unwrap()
    }

    #[test]
    fn tables_match_the_dataset() {
        let dataset = loaded();
        let mut conn = Connection::open_in_memory().unwrap();
        write_dataset(&mut conn, &dataset).unwrap();

        let hourly: i64 = conn
            .query_row("SELECT COUNT(*) FROM hourly_load", [], |r| r.get(0))
            .unwrap();
        assert_eq!(hourly, 6);

        let mean: f64 = conn
            .query_row(
                "SELECT load FROM daily_load WHERE location = 'MIDATL' AND date = '2015-12-31'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(mean, 95.);

        let locations: i64 = conn
            .query_row("SELECT COUNT(*) FROM locations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(locations, 2);
    }

    #[test]
    fn exporting_twice_replaces_tables() {
        let dataset = loaded();
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("load.sqlite");
        export_sqlite(&db, &dataset).unwrap();
        export_sqlite(&db, &dataset).unwrap();

        let conn = Connection::open(&db).unwrap();
        let daily: i64 = conn
            .query_row("SELECT COUNT(*) FROM daily_load", [], |r| r.get(0))
            .unwrap();
        assert_eq!(daily, dataset.daily().len() as i64);
    }
}
