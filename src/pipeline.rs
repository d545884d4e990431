//! The end-to-end run: fetch, normalize, export raw, resample, export resampled, plot.

use crate::api::fetcher::DEFAULT_LIMIT;
use crate::error::MetObsError;
use crate::metobs::MetObs;
use crate::series::export::CsvExporter;
use crate::series::resample::{ResampledSeries, Resampler};
use crate::types::observation::ObservationSeries;
use crate::types::parameter::Parameter;
use crate::types::period::ObservationPeriod;
use crate::types::station::StationId;
use bon::Builder;
use chrono::{Duration, FixedOffset, Offset, Utc};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Whether the resampler aggregates into coarser buckets or interpolates onto a finer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleMode {
    #[default]
    Downsample,
    UpsampleLinear,
}

/// Settings for one [`Pipeline`] run.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, FixedOffset};
/// use metobs::{Parameter, PipelineConfig, Resampler, StationId};
///
/// let config = PipelineConfig::builder()
///     .station(StationId::new("06074").unwrap())
///     .parameter(Parameter::TEMP_DRY)
///     .lookback(Duration::days(2))
///     .utc_offset(FixedOffset::east_opt(2 * 3600).unwrap())
///     .resampler(Resampler::hourly().with_offset(Duration::minutes(25)))
///     .resampled_column("temp_dry_downsample")
///     .output_dir("data")
///     .build();
/// assert_eq!(config.station().as_str(), "06074");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct PipelineConfig {
    station: StationId,
    #[builder(into)]
    parameter: Parameter,
    /// How far back from now to query. Ignored when `period` is set.
    #[builder(default = Duration::days(2))]
    lookback: Duration,
    /// Fixed query period, taking precedence over `lookback`.
    period: Option<ObservationPeriod>,
    /// Offset applied to the UTC timestamps from the API.
    #[builder(default = Utc.fix())]
    utc_offset: FixedOffset,
    /// Shift applied to the raw series before export.
    #[builder(default = Duration::zero())]
    raw_offset: Duration,
    #[builder(default)]
    resampler: Resampler,
    #[builder(default)]
    mode: ResampleMode,
    /// Name for the resampled value column, `<parameter>_downsample` by default.
    #[builder(into)]
    resampled_column: Option<String>,
    #[builder(into, default = PathBuf::from("."))]
    output_dir: PathBuf,
    #[builder(default = DEFAULT_LIMIT)]
    limit: u32,
    /// Write the comparison plot (requires the `plot` feature).
    #[builder(default = true)]
    plot: bool,
    #[builder(default)]
    open_plot: bool,
}

impl PipelineConfig {
    pub fn station(&self) -> &StationId {
        &self.station
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The period to query: the fixed one if set, otherwise `lookback` up to now.
    pub fn resolve_period(&self) -> ObservationPeriod {
        self.period
            .unwrap_or_else(|| ObservationPeriod::last(self.lookback, self.utc_offset))
    }
}

/// What a [`Pipeline`] run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub period: ObservationPeriod,
    pub raw_path: PathBuf,
    pub resampled_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub raw_rows: usize,
    pub resampled_rows: usize,
    pub possibly_truncated: bool,
}

pub struct Pipeline {
    client: MetObs,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(client: MetObs, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every step once, in order.
    ///
    /// # Errors
    ///
    /// Returns [`MetObsError::EmptyResult`] before writing anything when the API returns no
    /// observations, and propagates request, resampling and export failures.
    pub async fn run(&self) -> Result<PipelineReport, MetObsError> {
        let config = &self.config;
        let period = config.resolve_period();

        let raw = self
            .client
            .observations()
            .station(&config.station)
            .parameter(&config.parameter)
            .period(period)
            .limit(config.limit)
            .utc_offset(config.utc_offset)
            .call()
            .await?;
        if raw.is_empty() {
            return Err(MetObsError::EmptyResult {
                station: config.station.clone(),
                parameter: config.parameter.clone(),
                period,
            });
        }
        let raw = raw.shift(config.raw_offset)?;
        log_summary(&raw);

        let exporter = CsvExporter::new(&config.output_dir);
        let raw_path = exporter.write(&raw, &config.station, &period).await?;

        let mut resampled = match config.mode {
            ResampleMode::Downsample => config.resampler.resample(&raw)?,
            ResampleMode::UpsampleLinear => config.resampler.upsample_linear(&raw)?,
        };
        if let Some(column) = &config.resampled_column {
            resampled = resampled.with_column_name(column.clone());
        }
        info!(
            "Resampled {} rows into {} buckets of {} (offset {})",
            raw.len(),
            resampled.len(),
            resampled.width(),
            resampled.offset()
        );
        let resampled_path = exporter.write(&resampled, &config.station, &period).await?;

        let plot_path = self.plot(&raw, &resampled, &period).await?;

        Ok(PipelineReport {
            period,
            raw_path,
            resampled_path,
            plot_path,
            raw_rows: raw.len(),
            resampled_rows: resampled.len(),
            possibly_truncated: raw.possibly_truncated(),
        })
    }

    #[cfg(feature = "plot")]
    async fn plot(
        &self,
        raw: &ObservationSeries,
        resampled: &ResampledSeries,
        period: &ObservationPeriod,
    ) -> Result<Option<PathBuf>, MetObsError> {
        use crate::plot::ComparisonPlot;
        use crate::series::export::output_file_name;

        if !self.config.plot {
            return Ok(None);
        }
        let path = self.config.output_dir.join(output_file_name(
            raw.column_name(),
            raw.station(),
            period,
            "html",
        ));
        ComparisonPlot::new(format!("{} at station {}", raw.parameter(), raw.station()))
            .open_in_browser(self.config.open_plot)
            .write(raw, resampled, &path)
            .await?;
        Ok(Some(path))
    }

    #[cfg(not(feature = "plot"))]
    async fn plot(
        &self,
        _raw: &ObservationSeries,
        _resampled: &ResampledSeries,
        _period: &ObservationPeriod,
    ) -> Result<Option<PathBuf>, MetObsError> {
        if self.config.plot {
            warn!("Plotting requested but the `plot` feature is disabled");
        }
        Ok(None)
    }
}

fn log_summary(series: &ObservationSeries) {
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        info!(
            "{} rows of {} for station {} from {} to {}",
            series.len(),
            series.column_name(),
            series.station(),
            first.time,
            last.time
        );
    }
    if series.possibly_truncated() {
        warn!(
            "Series for station {} may be truncated by the request limit",
            series.station()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fetcher::test_server::{feature_collection, serve_once};
    use crate::series::error::ResampleError;
    use chrono::TimeZone;

    fn summer_time() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    fn period() -> ObservationPeriod {
        ObservationPeriod::lookback(
            summer_time().with_ymd_and_hms(2022, 6, 2, 12, 0, 0).unwrap(),
            Duration::days(2),
        )
    }

    /// Three hours of 10-minute observations, newest first.
    fn body() -> String {
        let start = Utc.with_ymd_and_hms(2022, 6, 1, 6, 0, 0).unwrap();
        let observed: Vec<(String, f64)> = (0..18)
            .rev()
            .map(|i| {
                let t = start + Duration::minutes(10 * i);
                (t.format("%Y-%m-%dT%H:%M:%SZ").to_string(), 15.0 + i as f64 / 10.0)
            })
            .collect();
        let rows: Vec<(&str, f64)> = observed.iter().map(|(t, v)| (t.as_str(), *v)).collect();
        feature_collection(&rows)
    }

    fn config(output_dir: &Path) -> PipelineConfig {
        PipelineConfig::builder()
            .station(StationId::new("06074").unwrap())
            .parameter("temp_dry")
            .period(period())
            .utc_offset(summer_time())
            .resampler(Resampler::hourly().with_offset(Duration::minutes(25)))
            .output_dir(output_dir)
            .plot(false)
            .build()
    }

    #[tokio::test]
    async fn run_writes_raw_and_resampled_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let (url, server) = serve_once(200, body()).await;
        let client = MetObs::builder().base_url(url).build()?;

        let report = Pipeline::new(client, config(dir.path())).run().await?;
        server.await?;

        assert_eq!(report.raw_rows, 18);
        assert_eq!(report.resampled_rows, 3);
        assert!(report.resampled_rows <= report.raw_rows);
        assert!(report.plot_path.is_none());
        assert_eq!(
            report.raw_path,
            dir.path().join("temp_dry_stat06074_2022-05-31-to-2022-06-02.csv")
        );
        assert_eq!(
            report.resampled_path,
            dir.path()
                .join("temp_dry_downsample_stat06074_2022-05-31-to-2022-06-02.csv")
        );

        let raw = std::fs::read_to_string(&report.raw_path)?;
        // 06:00 UTC is 08:00 at +02:00
        assert!(raw.lines().nth(1).unwrap().starts_with("2022-06-01 08:00:00,"));
        let resampled = std::fs::read_to_string(&report.resampled_path)?;
        let times: Vec<&str> = resampled.lines().skip(1).map(|l| &l[..19]).collect();
        assert_eq!(
            times,
            vec!["2022-06-01 08:25:00", "2022-06-01 09:25:00", "2022-06-01 10:25:00"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn run_applies_raw_offset_and_column_name() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let (url, server) = serve_once(200, body()).await;
        let client = MetObs::builder().base_url(url).build()?;
        let config = PipelineConfig::builder()
            .station(StationId::new("06074")?)
            .parameter(Parameter::TEMP_DRY)
            .period(period())
            .raw_offset(Duration::minutes(-10))
            .resampled_column("temp_dry_hourly")
            .output_dir(dir.path())
            .plot(false)
            .build();

        let report = Pipeline::new(client, config).run().await?;
        server.await?;

        let raw = std::fs::read_to_string(&report.raw_path)?;
        // no UTC offset configured, so the raw series stays in UTC
        assert!(raw.lines().nth(1).unwrap().starts_with("2022-06-01 05:50:00,"));
        assert!(report
            .resampled_path
            .to_string_lossy()
            .contains("temp_dry_hourly_stat06074"));
        Ok(())
    }

    #[tokio::test]
    async fn empty_response_fails_before_writing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let (url, server) = serve_once(200, feature_collection(&[])).await;
        let client = MetObs::builder().base_url(url).build()?;

        let result = Pipeline::new(client, config(dir.path())).run().await;
        server.await?;

        assert!(matches!(result, Err(MetObsError::EmptyResult { .. })));
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unrepresentable_raw_offset_fails_before_writing(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let (url, server) = serve_once(200, body()).await;
        let client = MetObs::builder().base_url(url).build()?;
        let config = PipelineConfig::builder()
            .station(StationId::new("06074")?)
            .parameter(Parameter::TEMP_DRY)
            .period(period())
            .raw_offset(Duration::days(100_000_000))
            .output_dir(dir.path())
            .plot(false)
            .build();

        let result = Pipeline::new(client, config).run().await;
        server.await?;

        assert!(matches!(
            result,
            Err(MetObsError::Resample(ResampleError::OffsetOutOfRange(_)))
        ));
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn upsample_mode_interpolates()-> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let (url, server) = serve_once(200, body()).await;
        let client = MetObs::builder().base_url(url).build()?;
        let config = PipelineConfig::builder()
            .station(StationId::new("06074")?)
            .parameter(Parameter::TEMP_DRY)
            .period(period())
            .resampler(Resampler::new(Duration::minutes(5))?)
            .mode(ResampleMode::UpsampleLinear)
            .output_dir(dir.path())
            .plot(false)
            .build();

        let report = Pipeline::new(client, config).run().await?;
        server.await?;

        // 06:00..=08:50 in 5 minute steps
        assert_eq!(report.resampled_rows, 35);
        assert!(report
            .resampled_path
            .to_string_lossy()
            .contains("temp_dry_upsample_stat06074"));
        Ok(())
    }

    #[cfg(feature = "plot")]
    #[tokio::test]
    async fn run_writes_plot_when_enabled() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let (url, server) = serve_once(200, body()).await;
        let client = MetObs::builder().base_url(url).build()?;
        let config = PipelineConfig::builder()
            .station(StationId::new("06074")?)
            .parameter(Parameter::TEMP_DRY)
            .period(period())
            .output_dir(dir.path())
            .build();

        let report = Pipeline::new(client, config).run().await?;
        server.await?;

        let plot_path = report.plot_path.expect("plot path");
        assert!(plot_path.is_file());
        assert_eq!(plot_path.extension().and_then(|e| e.to_str()), Some("html"));
        Ok(())
    }
}
