//! Comparison plot of a raw series against its resampled derivative.

use crate::series::error::ExportError;
use crate::series::frame::TIME_COLUMN;
use crate::series::resample::ResampledSeries;
use crate::types::observation::ObservationSeries;
use chrono::NaiveDateTime;
use log::info;
use plotlars::{Legend, Plot, Rgb, Shape, Text, TimeSeriesPlot};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::task;

const PLOT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Joins both series on local time into one frame: `time` as text, then the raw value column
/// and the resampled value column.
///
/// The two series rarely share timestamps (the resampled one is offset), so most rows carry
/// a null in one of the value columns. Empty resampled buckets are left out.
pub fn comparison_frame(
    raw: &ObservationSeries,
    resampled: &ResampledSeries,
) -> PolarsResult<DataFrame> {
    let mut rows: BTreeMap<NaiveDateTime, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for observation in raw {
        rows.entry(observation.time.naive_local()).or_default().0 = Some(observation.value);
    }
    for bucket in resampled.iter() {
        if let Some(value) = bucket.value {
            rows.entry(bucket.time.naive_local()).or_default().1 = Some(value);
        }
    }

    let times: Vec<String> = rows
        .keys()
        .map(|t| t.format(PLOT_TIME_FORMAT).to_string())
        .collect();
    let (raw_values, resampled_values): (Vec<Option<f64>>, Vec<Option<f64>>) =
        rows.into_values().unzip();

    DataFrame::new(vec![
        Series::new(TIME_COLUMN.into(), times).into(),
        Series::new(raw.column_name().into(), raw_values).into(),
        Series::new(resampled.column_name().into(), resampled_values).into(),
    ])
}

/// Renders the raw series in blue and the resampled series in red, markers on a shared time axis.
#[derive(Debug, Clone)]
pub struct ComparisonPlot {
    title: String,
    open_in_browser: bool,
}

impl ComparisonPlot {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            open_in_browser: false,
        }
    }

    /// Also show the plot in the default browser after writing it.
    pub fn open_in_browser(mut self, open: bool) -> Self {
        self.open_in_browser = open;
        self
    }

    /// Writes the plot as a standalone HTML file at `path`.
    pub async fn write(
        &self,
        raw: &ObservationSeries,
        resampled: &ResampledSeries,
        path: &Path,
    ) -> Result<(), ExportError> {
        let df = comparison_frame(raw, resampled)?;
        let raw_column = raw.column_name().to_string();
        let resampled_column = resampled.column_name().to_string();
        let title = self.title.clone();
        let open = self.open_in_browser;
        let target = path.to_string_lossy().into_owned();

        task::spawn_blocking(move || {
            let plot = TimeSeriesPlot::builder()
                .data(&df)
                .x(TIME_COLUMN)
                .y(raw_column.as_str())
                .additional_series(vec![resampled_column.as_str()])
                .size(6)
                .colors(vec![Rgb(0, 0, 255), Rgb(255, 0, 0)])
                // markers only, the two series never share an x value
                .with_shape(true)
                .width(0.0)
                .shapes(vec![Shape::Circle, Shape::Circle])
                .plot_title(Text::from(title.as_str()).font("Arial").size(18))
                .legend(&Legend::new().x(0.05).y(0.95))
                .x_title("Local time")
                .y_title(Text::from(resampled_column.as_str()).color(Rgb(0, 0, 0)))
                .build();
            plot.write_html(target);
            if open {
                plot.plot();
            }
        })
        .await?;

        info!("Wrote comparison plot to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::resample::Resampler;
    use crate::types::observation::Observation;
    use crate::types::parameter::Parameter;
    use crate::types::station::StationId;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn series() -> ObservationSeries {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let start = tz.with_ymd_and_hms(2021, 11, 29, 0, 0, 0).unwrap();
        let observations = (0..18)
            .map(|i| Observation::new(start + Duration::minutes(10 * i), 1000.0 + i as f64))
            .collect();
        ObservationSeries::new(StationId::new("06184").unwrap(), Parameter::PRESSURE, observations)
    }

    #[test]
    fn comparison_frame_joins_both_series() -> Result<(), Box<dyn std::error::Error>> {
        let raw = series();
        let resampled = Resampler::hourly()
            .with_offset(Duration::minutes(25))
            .resample(&raw)?;
        let df = comparison_frame(&raw, &resampled)?;

        assert_eq!(df.get_column_names(), ["time", "pressure", "pressure_downsample"]);
        // 18 raw rows plus 3 resampled rows that fall between raw timestamps
        assert_eq!(df.height(), 21);
        assert_eq!(df.column("pressure")?.null_count(), 3);
        assert_eq!(df.column("pressure_downsample")?.null_count(), 18);
        let times: Vec<Option<&str>> = df.column("time")?.str()?.into_iter().collect();
        assert_eq!(times[0], Some("2021-11-29 00:00"));
        assert!(times.contains(&Some("2021-11-29 00:25")));
        Ok(())
    }

    #[tokio::test]
    async fn writes_html_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pressure_stat06184.html");
        let raw = series();
        let resampled = Resampler::hourly().resample(&raw)?;
        ComparisonPlot::new("pressure at station 06184")
            .write(&raw, &resampled, &path)
            .await?;
        let html = std::fs::read_to_string(&path)?;
        assert!(html.to_lowercase().contains("plotly"));
        Ok(())
    }

    #[tokio::test]
    async fn traces_draw_no_connecting_lines() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pressure_stat06184.html");
        let raw = series();
        let resampled = Resampler::hourly().resample(&raw)?;
        ComparisonPlot::new("pressure at station 06184")
            .write(&raw, &resampled, &path)
            .await?;
        let html = std::fs::read_to_string(&path)?;
        // one zero-width line per trace
        assert!(html.matches(r#""width":0.0"#).count() >= 2);
        Ok(())
    }
}
