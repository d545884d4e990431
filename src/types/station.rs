//! Identifier type for DMI weather stations.

use crate::error::MetObsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The identifier of a DMI weather station (e.g. "06074" for Århus Syd).
///
/// Station ids are numeric codes, but leading zeros are significant, so the id is
/// kept as text. Construction validates that the id is a non-empty string of ASCII digits.
///
/// # Examples
///
/// ```
/// use metobs::StationId;
///
/// let station: StationId = "06074".parse().unwrap();
/// assert_eq!(station.as_str(), "06074");
/// assert!("06o74".parse::<StationId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Creates a `StationId`, returning [`MetObsError::InvalidStationId`] when `id`
    /// is empty or contains anything other than ASCII digits.
    pub fn new(id: impl Into<String>) -> Result<Self, MetObsError> {
        let id = id.into();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(MetObsError::InvalidStationId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StationId {
    type Err = MetObsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StationId {
    type Error = MetObsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for StationId {
    type Error = MetObsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StationId> for String {
    fn from(value: StationId) -> Self {
        value.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
