//! Identifiers for the measured quantities ("parameters") served by the metObs API.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A metObs parameter id, such as `temp_dry` or `pressure`.
///
/// Commonly used parameters are available as associated constants. Any other id from the
/// DMI parameter list can be built with [`Parameter::new`] or converted from a string.
///
/// # Examples
///
/// ```
/// use metobs::Parameter;
///
/// assert_eq!(Parameter::TEMP_DRY.as_str(), "temp_dry");
/// assert_eq!(Parameter::from("visibility").to_string(), "visibility");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Parameter(Cow<'static, str>);

impl Parameter {
    /// Present air temperature (°C).
    pub const TEMP_DRY: Parameter = Parameter(Cow::Borrowed("temp_dry"));
    /// Present dew point temperature (°C).
    pub const TEMP_DEW: Parameter = Parameter(Cow::Borrowed("temp_dew"));
    /// Mean air temperature over the last hour (°C).
    pub const TEMP_MEAN_PAST1H: Parameter = Parameter(Cow::Borrowed("temp_mean_past1h"));
    /// Present relative humidity (%).
    pub const HUMIDITY: Parameter = Parameter(Cow::Borrowed("humidity"));
    /// Atmospheric pressure at station level (hPa).
    pub const PRESSURE: Parameter = Parameter(Cow::Borrowed("pressure"));
    /// Atmospheric pressure reduced to sea level (hPa).
    pub const PRESSURE_AT_SEA: Parameter = Parameter(Cow::Borrowed("pressure_at_sea"));
    /// Mean wind speed over the last 10 minutes (m/s).
    pub const WIND_SPEED: Parameter = Parameter(Cow::Borrowed("wind_speed"));
    /// Mean wind direction over the last 10 minutes (degrees).
    pub const WIND_DIR: Parameter = Parameter(Cow::Borrowed("wind_dir"));
    /// Accumulated precipitation over the last 10 minutes (mm).
    pub const PRECIP_PAST10MIN: Parameter = Parameter(Cow::Borrowed("precip_past10min"));
    /// Accumulated precipitation over the last hour (mm).
    pub const PRECIP_PAST1H: Parameter = Parameter(Cow::Borrowed("precip_past1h"));

    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Parameter {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Parameter> for String {
    fn from(value: Parameter) -> Self {
        value.0.into_owned()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
