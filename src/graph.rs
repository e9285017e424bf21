//! ### Graph
//! Renders the daily aggregate as a shareable png, one line per location.

use anyhow::bail;
use chrono::{Duration, NaiveDate};
use plotters::backend::BitMapBackend;
use plotters::chart::ChartBuilder;
use plotters::chart::SeriesLabelPosition;
use plotters::drawing::IntoDrawingArea;
use plotters::prelude::Rectangle;
use plotters::series::LineSeries;
use plotters::style::Color;
use plotters::style::Palette;
use plotters::style::Palette99;
use plotters::style::RGBColor;
use plotters::style::BLACK;
use plotters::style::WHITE;
use std::path::Path;

use crate::model::{DailyAggregate, LocationSet};

pub struct Graphing<'a> {
    path: &'a Path,
}

impl<'a> Graphing<'a> {
    const CHART_COLOR: RGBColor = WHITE;

    pub fn new(path: &'a Path) -> Self {
        Graphing { path }
    }

    pub fn daily_load(&self, daily: &DailyAggregate, locations: &LocationSet) -> anyhow::Result<()> {
        let Some((first, last)) = date_span(daily) else {
            bail!("No daily load to chart");
        };
        let Some((min_load, max_load)) = load_span(daily) else {
            bail!("Daily load has no values");
        };
        let pad = ((max_load - min_load) * 0.05).max(1.);
        let days = (last - first).num_days();

        let root = BitMapBackend::new(self.path, (1440, 720)).into_drawing_area();
        root.fill(&Self::CHART_COLOR)?;

        let mut chart = ChartBuilder::on(&root)
            .x_label_area_size(72)
            .y_label_area_size(96)
            .margin(20)
            .caption("Daily average load", ("sans-serif", 40.))
            .build_cartesian_2d(0..days.max(1), (min_load - pad)..(max_load + pad))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(WHITE.mix(0.3))
            .y_desc("Load (kW)")
            .x_desc("Date")
            .axis_desc_style(("sans-serif", 30))
            .x_label_formatter(&|&offset| (first + Duration::days(offset)).format("%Y-%m").to_string())
            .x_labels(12)
            .y_labels(10)
            .x_label_style(("sans-serif", 16))
            .y_label_style(("sans-serif", 16))
            .draw()?;

        for (idx, location) in locations.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            let runs = contiguous_runs(daily, location, first);
            for (run_idx, run) in runs.into_iter().enumerate() {
                let series = chart.draw_series(LineSeries::new(run, color.stroke_width(2)))?;
                if run_idx == 0 {
                    series.label(location).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });
                }
            }
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 16))
            .draw()?;

        root.present()?;

        Ok(())
    }
}

fn date_span(daily: &DailyAggregate) -> Option<(NaiveDate, NaiveDate)> {
    let first = daily.iter().map(|row| row.date).min()?;
    let last = daily.iter().map(|row| row.date).max()?;
    Some((first, last))
}

fn load_span(daily: &DailyAggregate) -> Option<(f64, f64)> {
    daily
        .iter()
        .filter_map(|row| row.load)
        .fold(None, |acc, load| match acc {
            None => Some((load, load)),
            Some((lo, hi)) => Some((load.min(lo), load.max(hi))),
        })
}

/// One location's points as (days since `origin`, load), split wherever a
/// day has no value so gaps are not drawn over.
fn contiguous_runs(daily: &DailyAggregate, location: &str, origin: NaiveDate) -> Vec<Vec<(i64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for row in daily.iter().filter(|row| row.location == location) {
        match row.load {
            Some(load) => current.push(((row.date - origin).num_days(), load)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
