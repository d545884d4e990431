//! Time ranges used to query the metObs API and to label output files.

use crate::error::MetObsError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, SecondsFormat, Utc};
use std::fmt;

/// A closed time range `[start, end]` with its own UTC offset.
///
/// The offset only affects presentation: the query string and the calendar dates used in
/// output file names are rendered in it. Both bounds are converted to the offset of `end`
/// on construction so that a period always formats consistently.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, FixedOffset, TimeZone};
/// use metobs::ObservationPeriod;
///
/// let cet = FixedOffset::east_opt(3600).unwrap();
/// let end = cet.with_ymd_and_hms(2021, 11, 30, 12, 0, 0).unwrap();
/// let period = ObservationPeriod::lookback(end, Duration::days(2));
///
/// assert_eq!(
///     period.to_query_value(),
///     "2021-11-28T12:00:00+01:00/2021-11-30T12:00:00+01:00"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationPeriod {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl ObservationPeriod {
    /// Creates a period from explicit bounds. Returns [`MetObsError::InvalidPeriod`]
    /// when `start` lies after `end`.
    pub fn new(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, MetObsError> {
        if start > end {
            return Err(MetObsError::InvalidPeriod { start, end });
        }
        Ok(Self {
            start: start.with_timezone(end.offset()),
            end,
        })
    }

    /// The period ending at `end` and reaching back `lookback`.
    ///
    /// A negative `lookback` is treated as its absolute value.
    pub fn lookback(end: DateTime<FixedOffset>, lookback: Duration) -> Self {
        Self {
            start: end - lookback.abs(),
            end,
        }
    }

    /// The period ending now, rendered in `offset`.
    pub fn last(lookback: Duration, offset: FixedOffset) -> Self {
        Self::lookback(Utc::now().with_timezone(&offset), lookback)
    }

    /// Value of the `datetime` query parameter: `<start>/<end>` in RFC 3339 with second precision.
    pub fn to_query_value(&self) -> String {
        format!(
            "{}/{}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Formats as `<start date>-to-<end date>`, the date-range label used in file names.
impl fmt::Display for ObservationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-to-{}",
            self.start_date().format("%Y-%m-%d"),
            self.end_date().format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summer() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn lookback_spans_requested_duration() {
        let end = summer().with_ymd_and_hms(2022, 6, 3, 8, 30, 0).unwrap();
        let period = ObservationPeriod::lookback(end, Duration::days(2));
        assert_eq!(period.duration(), Duration::days(2));
        assert_eq!(period.start_date(), NaiveDate::from_ymd_opt(2022, 6, 1).unwrap());
        assert_eq!(period.to_string(), "2022-06-01-to-2022-06-03");
    }

    #[test]
    fn query_value_uses_utc_designator_for_zero_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let end = utc.with_ymd_and_hms(2021, 11, 30, 0, 0, 0).unwrap();
        let period = ObservationPeriod::lookback(end, Duration::hours(1));
        assert_eq!(
            period.to_query_value(),
            "2021-11-29T23:00:00Z/2021-11-30T00:00:00Z"
        );
    }

    #[test]
    fn new_rejects_reversed_bounds() {
        let a = summer().with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        let b = summer().with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            ObservationPeriod::new(a, b),
            Err(MetObsError::InvalidPeriod { .. })
        ));
        assert!(ObservationPeriod::new(b, a).is_ok());
    }

    #[test]
    fn new_renders_start_in_end_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let start = utc.with_ymd_and_hms(2022, 1, 1, 23, 30, 0).unwrap();
        let end = summer().with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap();
        let period = ObservationPeriod::new(start, end).unwrap();
        assert_eq!(period.start_date(), NaiveDate::from_ymd_opt(2022, 1, 2).unwrap());
    }
}
