//! Conversion of series into Polars `DataFrame`s.
//!
//! Frames have two columns: `time`, a timezone-naive millisecond `Datetime` holding the local
//! wall-clock time of each row, and one `f64` value column named after the series.

use crate::series::resample::ResampledSeries;
use crate::types::observation::ObservationSeries;
use chrono::NaiveDateTime;
use polars::prelude::*;

pub const TIME_COLUMN: &str = "time";

/// Anything that can be laid out as a `time` + value table.
pub trait ToDataFrame {
    /// Name of the value column.
    fn value_column(&self) -> &str;

    fn to_dataframe(&self) -> PolarsResult<DataFrame>;
}

impl ToDataFrame for ObservationSeries {
    fn value_column(&self) -> &str {
        self.column_name()
    }

    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        time_value_frame(
            self.iter().map(|o| o.time.naive_local()),
            self.value_column(),
            self.iter().map(|o| Some(o.value)).collect(),
        )
    }
}

impl ToDataFrame for ResampledSeries {
    fn value_column(&self) -> &str {
        self.column_name()
    }

    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        time_value_frame(
            self.iter().map(|b| b.time.naive_local()),
            self.value_column(),
            self.iter().map(|b| b.value).collect(),
        )
    }
}

pub(crate) fn datetime_series(
    name: &str,
    times: impl Iterator<Item = NaiveDateTime>,
) -> PolarsResult<Series> {
    let millis: Vec<i64> = times.map(|t| t.and_utc().timestamp_millis()).collect();
    Series::new(name.into(), millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

fn time_value_frame(
    times: impl Iterator<Item = NaiveDateTime>,
    column: &str,
    values: Vec<Option<f64>>,
) -> PolarsResult<DataFrame> {
    let time = datetime_series(TIME_COLUMN, times)?;
    let values = Series::new(column.into(), values);
    DataFrame::new(vec![time.into(), values.into()])
}
