use crate::api::error::ObservationDataError;
use crate::api::response::FeatureCollection;
use crate::types::observation::Observation;
use crate::types::parameter::Parameter;
use crate::types::period::ObservationPeriod;
use crate::types::station::StationId;
use log::{info, warn};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://dmigw.govcloud.dk/v2/metObs/collections/observation/items";
pub const DEFAULT_LIMIT: u32 = 300_000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything that goes into one `observation/items` request.
#[derive(Debug, Clone)]
pub struct ObservationQuery<'a> {
    pub station: &'a StationId,
    pub parameter: &'a Parameter,
    pub period: &'a ObservationPeriod,
    pub limit: u32,
}

impl ObservationQuery<'_> {
    fn params(&self, api_key: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if let Some(key) = api_key {
            params.push(("api-key", key.to_string()));
        }
        params.push(("datetime", self.period.to_query_value()));
        params.push(("stationId", self.station.to_string()));
        params.push(("parameterId", self.parameter.to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }
}

/// Raw rows of one response, plus whether the server hit the request limit.
#[derive(Debug)]
pub struct FetchedObservations {
    pub observations: Vec<Observation>,
    pub possibly_truncated: bool,
}

pub struct ObservationFetcher {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ObservationFetcher {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ObservationDataError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ObservationDataError::ClientBuild)?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs the single GET request and flattens the returned features.
    pub async fn fetch(
        &self,
        query: &ObservationQuery<'_>,
    ) -> Result<FetchedObservations, ObservationDataError> {
        let url = self.base_url.clone();
        info!(
            "Requesting {} for station {} over {} from {}",
            query.parameter,
            query.station,
            query.period.to_query_value(),
            url
        );

        let response = self
            .client
            .get(&url)
            .query(&query.params(self.api_key.as_deref()))
            .send()
            .await
            .map_err(|e| ObservationDataError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    ObservationDataError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    ObservationDataError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| ObservationDataError::ResponseBody(url.clone(), e))?;
        let collection: FeatureCollection = serde_json::from_str(&body)
            .map_err(|source| ObservationDataError::JsonParse {
                url: url.clone(),
                source,
            })?;

        let returned = collection.returned();
        let possibly_truncated = returned >= u64::from(query.limit);
        if possibly_truncated {
            warn!(
                "Response for station {} returned {} records, reaching the limit of {}; older observations may be missing",
                query.station, returned, query.limit
            );
        }

        let observations = collection.into_observations()?;
        info!(
            "Received {} observations of {} for station {}",
            observations.len(),
            query.parameter,
            query.station
        );
        Ok(FetchedObservations {
            observations,
            possibly_truncated,
        })
    }
}
