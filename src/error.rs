use crate::api::error::ObservationDataError;
use crate::series::error::{ExportError, ResampleError};
use crate::types::parameter::Parameter;
use crate::types::period::ObservationPeriod;
use crate::types::station::StationId;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetObsError {
    #[error(transparent)]
    ObservationData(#[from] ObservationDataError),

    #[error(transparent)]
    Resample(#[from] ResampleError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("No observations of '{parameter}' for station {station} in {period}")]
    EmptyResult {
        station: StationId,
        parameter: Parameter,
        period: ObservationPeriod,
    },

    #[error("Invalid station id '{0}': expected a numeric code")]
    InvalidStationId(String),

    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
}
