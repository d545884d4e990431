//! Fixed-width time-bucket resampling.
//!
//! Buckets are aligned to whole multiples of the bucket width counted from the Unix epoch on the
//! series' local wall clock, so hourly buckets start on the hour and daily buckets at local
//! midnight. Every bucket between the first and the last observation is emitted, including
//! empty ones, which keeps the output evenly spaced.

use crate::series::error::ResampleError;
use crate::types::observation::ObservationSeries;
use crate::types::parameter::Parameter;
use crate::types::station::StationId;
use chrono::{DateTime, Duration, FixedOffset};

/// How the values falling into one bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// Arithmetic mean. Empty buckets have no value.
    #[default]
    Mean,
    /// Smallest value. Empty buckets have no value.
    Min,
    /// Largest value. Empty buckets have no value.
    Max,
    /// Sum of values. Empty buckets sum to `0.0`.
    Sum,
    /// Number of values. Empty buckets count `0.0`.
    Count,
}

/// One output row of a resampled series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Bucket start plus the resampler's offset.
    pub time: DateTime<FixedOffset>,
    pub value: Option<f64>,
}

/// The result of [`Resampler::resample`] or [`Resampler::upsample_linear`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledSeries {
    station: StationId,
    parameter: Parameter,
    column: String,
    width: Duration,
    offset: Duration,
    buckets: Vec<Bucket>,
}

impl ResampledSeries {
    pub fn station(&self) -> &StationId {
        &self.station
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// Name of the value column when written out, `<parameter>_downsample` unless renamed.
    pub fn column_name(&self) -> &str {
        &self.column
    }

    /// Renames the value column, e.g. to describe a changed unit after aggregation.
    pub fn with_column_name(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn width(&self) -> Duration {
        self.width
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(&self, aggregation: Aggregation) -> Option<f64> {
        match aggregation {
            Aggregation::Sum => Some(self.sum),
            Aggregation::Count => Some(self.count as f64),
            _ if self.count == 0 => None,
            Aggregation::Mean => Some(self.sum / self.count as f64),
            Aggregation::Min => Some(self.min),
            Aggregation::Max => Some(self.max),
        }
    }
}

/// Groups a series into fixed-width buckets and shifts the bucket timestamps by a constant.
///
/// The offset models sensors whose value describes the interval *preceding* the reported
/// time: e.g. hourly means of 10-minute data moved forward by 25 minutes.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use metobs::{Aggregation, Resampler};
///
/// let resampler = Resampler::new(Duration::hours(1))
///     .unwrap()
///     .with_offset(Duration::minutes(25))
///     .with_aggregation(Aggregation::Mean);
/// assert_eq!(resampler.width(), Duration::hours(1));
/// assert!(Resampler::new(Duration::zero()).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resampler {
    width: Duration,
    offset: Duration,
    aggregation: Aggregation,
}

impl Default for Resampler {
    fn default() -> Self {
        Self::hourly()
    }
}

impl Resampler {
    pub fn new(width: Duration) -> Result<Self, ResampleError> {
        if width.num_milliseconds() <= 0 {
            return Err(ResampleError::NonPositiveWidth(width));
        }
        if width != Duration::milliseconds(width.num_milliseconds()) {
            return Err(ResampleError::SubMillisecondWidth(width));
        }
        Ok(Self {
            width,
            offset: Duration::zero(),
            aggregation: Aggregation::Mean,
        })
    }

    /// One-hour buckets, no offset, mean aggregation.
    pub fn hourly() -> Self {
        Self {
            width: Duration::hours(1),
            offset: Duration::zero(),
            aggregation: Aggregation::Mean,
        }
    }

    pub fn with_offset(mut self, offset: Duration) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn width(&self) -> Duration {
        self.width
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    /// Downsamples `series`: one bucket per `width`, from the bucket holding the first
    /// observation up to the bucket holding the last one.
    pub fn resample(&self, series: &ObservationSeries) -> Result<ResampledSeries, ResampleError> {
        let column = format!("{}_downsample", series.parameter());
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Ok(self.empty(series, column));
        };
        let tz = *first.time.offset();
        let width_ms = self.width.num_milliseconds();
        let first_index = local_millis(first.time, tz).div_euclid(width_ms);
        let last_index = local_millis(last.time, tz).div_euclid(width_ms);

        let mut accumulators = vec![Accumulator::new(); (last_index - first_index + 1) as usize];
        for observation in series {
            let index = local_millis(observation.time, tz).div_euclid(width_ms) - first_index;
            accumulators[index as usize].push(observation.value);
        }

        let buckets = accumulators
            .iter()
            .zip(first_index..)
            .map(|(acc, index)| {
                Ok(Bucket {
                    time: self.bucket_time(index, width_ms, tz)?,
                    value: acc.finish(self.aggregation),
                })
            })
            .collect::<Result<Vec<_>, ResampleError>>()?;

        Ok(ResampledSeries {
            buckets,
            ..self.empty(series, column)
        })
    }

    /// Upsamples `series` onto a regular grid of `width`, filling each grid point by linear
    /// interpolation in time between the neighbouring observations.
    ///
    /// The grid covers the aligned points within `[first, last]`; nothing is extrapolated.
    /// The aggregation setting is not used.
    pub fn upsample_linear(
        &self,
        series: &ObservationSeries,
    ) -> Result<ResampledSeries, ResampleError> {
        let column = format!("{}_upsample", series.parameter());
        let Some(first) = series.first() else {
            return Ok(self.empty(series, column));
        };
        let tz = *first.time.offset();
        let width_ms = self.width.num_milliseconds();
        let points: Vec<(i64, f64)> = series
            .iter()
            .map(|o| (local_millis(o.time, tz), o.value))
            .collect();
        let first_index = -(-points[0].0).div_euclid(width_ms);
        let last_index = points[points.len() - 1].0.div_euclid(width_ms);

        let mut buckets = Vec::new();
        let mut j = 0;
        for index in first_index..=last_index {
            let t = index * width_ms;
            while j + 1 < points.len() && points[j + 1].0 <= t {
                j += 1;
            }
            let (t0, v0) = points[j];
            let value = match points.get(j + 1) {
                Some(&(t1, v1)) if t0 != t => v0 + (v1 - v0) * ((t - t0) as f64 / (t1 - t0) as f64),
                _ => v0,
            };
            buckets.push(Bucket {
                time: self.bucket_time(index, width_ms, tz)?,
                value: Some(value),
            });
        }

        Ok(ResampledSeries {
            buckets,
            ..self.empty(series, column)
        })
    }

    /// Grid cell `index` moved by the offset.
    fn bucket_time(
        &self,
        index: i64,
        width_ms: i64,
        tz: FixedOffset,
    ) -> Result<DateTime<FixedOffset>, ResampleError> {
        grid_time(index, width_ms, tz)?
            .checked_add_signed(self.offset)
            .ok_or(ResampleError::OutOfRange(index))
    }

    fn empty(&self, series: &ObservationSeries, column: String) -> ResampledSeries {
        ResampledSeries {
            station: series.station().clone(),
            parameter: series.parameter().clone(),
            column,
            width: self.width,
            offset: self.offset,
            buckets: Vec::new(),
        }
    }
}

/// Milliseconds since the epoch as read on the wall clock of `tz`.
fn local_millis(time: DateTime<FixedOffset>, tz: FixedOffset) -> i64 {
    time.with_timezone(&tz)
        .naive_local()
        .and_utc()
        .timestamp_millis()
}

/// Start of grid cell `index` as a datetime in `tz`.
fn grid_time(
    index: i64,
    width_ms: i64,
    tz: FixedOffset,
) -> Result<DateTime<FixedOffset>, ResampleError> {
    let local = index
        .checked_mul(width_ms)
        .and_then(DateTime::from_timestamp_millis)
        .ok_or(ResampleError::OutOfRange(index))?
        .naive_utc();
    let utc = local - Duration::seconds(i64::from(tz.local_minus_utc()));
    Ok(DateTime::from_naive_utc_and_offset(utc, tz))
}
