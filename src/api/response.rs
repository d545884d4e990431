//! Serde model of the metObs `observation/items` response and its flattening into rows.
//!
//! The endpoint answers with a GeoJSON `FeatureCollection`. Only the `properties` of each
//! feature carry the measurement; the rest is kept for completeness but never reaches the table.

use crate::api::error::ObservationDataError;
use crate::types::observation::Observation;
use chrono::DateTime;
use log::debug;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
    pub number_returned: Option<u64>,
    pub time_stamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub id: Option<String>,
    pub geometry: Option<Geometry>,
    pub properties: Properties,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// `[longitude, latitude]`
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    pub observed: String,
    pub value: Option<f64>,
    pub parameter_id: Option<String>,
    pub station_id: Option<String>,
    pub created: Option<String>,
}

impl FeatureCollection {
    /// Number of records the server reports having returned, falling back to the
    /// number of features when the field is absent.
    pub fn returned(&self) -> u64 {
        self.number_returned
            .unwrap_or_else(|| self.features.len() as u64)
    }

    /// Turns each feature's `observed`/`value` pair into an [`Observation`].
    ///
    /// Features without a value are skipped. Timestamps keep the offset they were reported in
    /// (UTC for metObs).
    pub fn into_observations(self) -> Result<Vec<Observation>, ObservationDataError> {
        let mut observations = Vec::with_capacity(self.features.len());
        for feature in self.features {
            let Some(value) = feature.properties.value else {
                debug!(
                    "Skipping feature {:?} observed at {} without a value",
                    feature.id, feature.properties.observed
                );
                continue;
            };
            let time = DateTime::parse_from_rfc3339(&feature.properties.observed).map_err(
                |source| ObservationDataError::InvalidTimestamp {
                    value: feature.properties.observed.clone(),
                    source,
                },
            )?;
            observations.push(Observation::new(time, value));
        }
        Ok(observations)
    }
}
