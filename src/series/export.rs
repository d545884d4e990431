//! Persisting series as CSV files.

use crate::series::error::ExportError;
use crate::series::frame::ToDataFrame;
use crate::types::period::ObservationPeriod;
use crate::types::station::StationId;
use crate::utils::ensure_output_dir_exists;
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// File name `<column>_stat<station>_<start date>-to-<end date>.<extension>`.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, FixedOffset, TimeZone};
/// use metobs::{output_file_name, ObservationPeriod, StationId};
///
/// let tz = FixedOffset::east_opt(3600).unwrap();
/// let period = ObservationPeriod::lookback(
///     tz.with_ymd_and_hms(2021, 11, 30, 9, 0, 0).unwrap(),
///     Duration::days(1),
/// );
/// let station = StationId::new("06184").unwrap();
/// assert_eq!(
///     output_file_name("pressure", &station, &period, "csv"),
///     "pressure_stat06184_2021-11-29-to-2021-11-30.csv"
/// );
/// ```
pub fn output_file_name(
    column: &str,
    station: &StationId,
    period: &ObservationPeriod,
    extension: &str,
) -> String {
    format!("{}_stat{}_{}.{}", column, station, period, extension)
}

/// Writes series into one output directory, naming files after column, station and period.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, column: &str, station: &StationId, period: &ObservationPeriod) -> PathBuf {
        self.output_dir
            .join(output_file_name(column, station, period, "csv"))
    }

    /// Writes `series` to `<output_dir>/<column>_stat<station>_<period>.csv` and returns the path.
    pub async fn write<S: ToDataFrame>(
        &self,
        series: &S,
        station: &StationId,
        period: &ObservationPeriod,
    ) -> Result<PathBuf, ExportError> {
        ensure_output_dir_exists(&self.output_dir).await?;
        let path = self.path_for(series.value_column(), station, period);
        let df = series.to_dataframe()?;
        let rows = df.height();
        write_csv(df, &path).await?;
        info!("Wrote {} rows to {}", rows, path.display());
        Ok(path)
    }
}

/// Writes a DataFrame as comma-separated text with a header row, using spawn_blocking.
pub async fn write_csv(mut df: DataFrame, path: &Path) -> Result<(), ExportError> {
    let path_buf = path.to_path_buf();
    task::spawn_blocking(move || {
        let file = std::fs::File::create(&path_buf)
            .map_err(|e| ExportError::WriteIo(path_buf.clone(), e))?;
        CsvWriter::new(file)
            .include_header(true)
            .with_separator(b',')
            .with_datetime_format(Some(DATETIME_FORMAT.to_string()))
            .finish(&mut df)
            .map_err(|e| ExportError::CsvWritePolars(path_buf, e))?;
        Ok::<(), ExportError>(())
    })
    .await??;
    Ok(())
}
