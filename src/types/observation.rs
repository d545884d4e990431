//! The observation series produced from a metObs response.

use crate::series::error::ResampleError;
use crate::types::parameter::Parameter;
use crate::types::station::StationId;
use chrono::{DateTime, Duration, FixedOffset};
use log::warn;

/// A single measurement of one parameter at one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub time: DateTime<FixedOffset>,
    pub value: f64,
}

impl Observation {
    pub fn new(time: DateTime<FixedOffset>, value: f64) -> Self {
        Self { time, value }
    }
}

/// Observations of one parameter at one station, ordered by time.
///
/// The series is always sorted ascending with strictly increasing timestamps: construction
/// sorts the input (the API returns the newest observation first) and drops repeated
/// timestamps, keeping the first occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    station: StationId,
    parameter: Parameter,
    observations: Vec<Observation>,
    possibly_truncated: bool,
}

impl ObservationSeries {
    pub fn new(
        station: StationId,
        parameter: Parameter,
        mut observations: Vec<Observation>,
    ) -> Self {
        observations.sort_by_key(|o| o.time);
        let before = observations.len();
        observations.dedup_by_key(|o| o.time);
        let dropped = before - observations.len();
        if dropped > 0 {
            warn!(
                "Dropped {} observations with duplicate timestamps for {} at station {}",
                dropped, parameter, station
            );
        }
        Self {
            station,
            parameter,
            observations,
            possibly_truncated: false,
        }
    }

    pub(crate) fn with_truncation_flag(mut self, possibly_truncated: bool) -> Self {
        self.possibly_truncated = possibly_truncated;
        self
    }

    pub fn station(&self) -> &StationId {
        &self.station
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// Name of the value column when the series is written out: the parameter id.
    pub fn column_name(&self) -> &str {
        self.parameter.as_str()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// `true` when the API returned as many records as the request limit allowed, meaning
    /// older observations in the requested period may be missing.
    pub fn possibly_truncated(&self) -> bool {
        self.possibly_truncated
    }

    /// Re-expresses every timestamp in `offset`. The instants are unchanged, only the
    /// wall-clock reading moves, which is how a UTC series is turned into local time.
    pub fn to_offset(mut self, offset: FixedOffset) -> Self {
        for observation in &mut self.observations {
            observation.time = observation.time.with_timezone(&offset);
        }
        self
    }

    /// Moves every timestamp by `by`. Ordering is preserved because all rows shift equally.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::OffsetOutOfRange`] if a shifted timestamp is not representable.
    pub fn shift(mut self, by: Duration) -> Result<Self, ResampleError> {
        if by.is_zero() {
            return Ok(self);
        }
        for observation in &mut self.observations {
            observation.time = observation
                .time
                .checked_add_signed(by)
                .ok_or(ResampleError::OffsetOutOfRange(by))?;
        }
        Ok(self)
    }
}

impl<'a> IntoIterator for &'a ObservationSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(h: u32, m: u32, value: f64) -> Observation {
        Observation::new(utc().with_ymd_and_hms(2021, 11, 30, h, m, 0).unwrap(), value)
    }

    fn series(observations: Vec<Observation>) -> ObservationSeries {
        ObservationSeries::new(
            StationId::new("06184").unwrap(),
            Parameter::PRESSURE,
            observations,
        )
    }

    #[test]
    fn new_sorts_descending_input() {
        let s = series(vec![at(2, 0, 3.0), at(1, 0, 2.0), at(0, 0, 1.0)]);
        let values: Vec<f64> = s.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert!(s.observations().windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn new_drops_duplicate_timestamps() {
        let s = series(vec![at(1, 0, 2.0), at(1, 0, 9.0), at(0, 0, 1.0)]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.last().unwrap().value, 2.0);
    }

    #[test]
    fn to_offset_keeps_instants() {
        let s = series(vec![at(22, 50, 1.0)]);
        let local = s.clone().to_offset(FixedOffset::east_opt(2 * 3600).unwrap());
        let o = local.first().unwrap();
        assert_eq!(o.time, s.first().unwrap().time);
        assert_eq!(o.time.hour(), 0);
        assert_eq!(o.time.minute(), 50);
    }

    #[test]
    fn shift_moves_every_timestamp() {
        let s = series(vec![at(0, 0, 1.0), at(0, 10, 2.0)]);
        let shifted = s.clone().shift(Duration::minutes(5)).unwrap();
        for (a, b) in s.iter().zip(shifted.iter()) {
            assert_eq!(b.time - a.time, Duration::minutes(5));
        }
    }

    #[test]
    fn shift_beyond_time_range_is_an_error() {
        let s = series(vec![at(0, 0, 1.0)]);
        assert!(matches!(
            s.clone().shift(Duration::days(100_000_000)),
            Err(ResampleError::OffsetOutOfRange(_))
        ));
        assert!(matches!(
            s.shift(-Duration::days(100_000_000)),
            Err(ResampleError::OffsetOutOfRange(_))
        ));
    }

    #[test]
    fn column_name_is_parameter_id() {
        assert_eq!(series(vec![]).column_name(), "pressure");
    }
}
