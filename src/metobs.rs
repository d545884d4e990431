//! This module provides the main entry point for the DMI metObs API client.
//! It fetches the observations of one parameter at one station over a time period and
//! returns them as a sorted [`ObservationSeries`].

use crate::api::fetcher::{
    ObservationFetcher, ObservationQuery, DEFAULT_BASE_URL, DEFAULT_LIMIT, DEFAULT_TIMEOUT,
};
use crate::error::MetObsError;
use crate::types::observation::ObservationSeries;
use crate::types::parameter::Parameter;
use crate::types::period::ObservationPeriod;
use crate::types::station::StationId;
use bon::bon;
use chrono::FixedOffset;
use std::time::Duration;

/// The client for the metObs `observation` collection.
///
/// Create an instance with [`MetObs::builder()`]. All settings are optional: without an API key
/// no `api-key` query parameter is sent, and the base URL defaults to the DMI gateway.
///
/// # Examples
///
/// ```rust
/// # use metobs::{MetObs, MetObsError};
/// # fn run() -> Result<(), MetObsError> {
/// let client = MetObs::builder()
///     .api_key("my-api-key")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct MetObs {
    fetcher: ObservationFetcher,
}

#[bon]
impl MetObs {
    /// Creates a new `MetObs` client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Key for the metObs API, sent as the `api-key` query parameter when set.
    /// * `base_url` - The `observation/items` endpoint. Defaults to the DMI gateway.
    /// * `timeout` - Timeout for the whole request. Defaults to 60 seconds.
    ///
    /// # Errors
    ///
    /// Returns [`MetObsError::ObservationData`] if the HTTP client cannot be initialized.
    #[builder]
    pub fn new(
        #[builder(into)] api_key: Option<String>,
        #[builder(into, default = DEFAULT_BASE_URL.to_string())] base_url: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
    ) -> Result<Self, MetObsError> {
        Ok(Self {
            fetcher: ObservationFetcher::new(base_url, api_key, timeout)?,
        })
    }

    /// Fetches the observations of `parameter` at `station` within `period`.
    ///
    /// The request is sent once. The rows are sorted ascending by time (the API delivers them
    /// newest first) and repeated timestamps are dropped. When `utc_offset` is given, every
    /// timestamp is re-expressed in that offset. The API reports UTC, so this turns the series
    /// into local time using a manually chosen offset (e.g. +02:00 for Danish summer time).
    ///
    /// # Optional Builder Methods
    ///
    /// * `.limit(u32)` - Maximum number of records the API may return. Defaults to 300000.
    ///   When the response reaches it, the series is flagged as
    ///   [`ObservationSeries::possibly_truncated`].
    /// * `.utc_offset(FixedOffset)` - Offset to express the timestamps in.
    ///
    /// # Errors
    ///
    /// Returns [`MetObsError::ObservationData`] for network failures, non-success HTTP status
    /// codes, undecodable responses and unparseable timestamps.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use metobs::{MetObs, MetObsError, ObservationPeriod, Parameter, StationId};
    /// use chrono::{Duration, FixedOffset};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), MetObsError> {
    /// let client = MetObs::builder().api_key("my-api-key").build()?;
    /// let summer_time = FixedOffset::east_opt(2 * 3600).unwrap();
    /// let station = StationId::new("06074")?;
    ///
    /// let series = client
    ///     .observations()
    ///     .station(&station)
    ///     .parameter(&Parameter::TEMP_DRY)
    ///     .period(ObservationPeriod::last(Duration::days(2), summer_time))
    ///     .utc_offset(summer_time)
    ///     .call()
    ///     .await?;
    ///
    /// println!("{} observations", series.len());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn observations(
        &self,
        station: &StationId,
        parameter: &Parameter,
        period: ObservationPeriod,
        #[builder(default = DEFAULT_LIMIT)] limit: u32,
        utc_offset: Option<FixedOffset>,
    ) -> Result<ObservationSeries, MetObsError> {
        let query = ObservationQuery {
            station,
            parameter,
            period: &period,
            limit,
        };
        let fetched = self.fetcher.fetch(&query).await?;

        let series = ObservationSeries::new(station.clone(), parameter.clone(), fetched.observations)
            .with_truncation_flag(fetched.possibly_truncated);
        Ok(match utc_offset {
            Some(offset) => series.to_offset(offset),
            None => series,
        })
    }

    pub fn base_url(&self) -> &str {
        self.fetcher.base_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ObservationDataError;
    use crate::api::fetcher::test_server::{feature_collection, serve_once};
    use chrono::{Duration as ChronoDuration, Offset, TimeZone, Timelike, Utc};

    #[test]
    fn defaults_to_dmi_gateway() -> Result<(), MetObsError> {
        let client = MetObs::builder().build()?;
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        Ok(())
    }

    #[tokio::test]
    async fn request_times_out_when_server_stalls() -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            // hold the connection open without answering
            let (socket, _) = listener.accept().await?;
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
            Ok::<_, std::io::Error>(())
        });

        let client = MetObs::builder()
            .base_url(format!("http://{addr}/items"))
            .timeout(Duration::from_millis(200))
            .build()?;
        let station = StationId::new("06074")?;
        let result = client
            .observations()
            .station(&station)
            .parameter(&Parameter::TEMP_DRY)
            .period(ObservationPeriod::last(ChronoDuration::hours(1), Utc.fix()))
            .call()
            .await;
        server.abort();

        match result {
            Err(MetObsError::ObservationData(ObservationDataError::NetworkRequest(_, e))) => {
                assert!(e.is_timeout());
            }
            other => panic!("expected a timeout, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn observations_are_sorted_and_shifted() -> Result<(), Box<dyn std::error::Error>> {
        let body = feature_collection(&[
            ("2021-11-30T22:20:00Z", 3.0),
            ("2021-11-30T22:10:00Z", 2.0),
            ("2021-11-30T22:00:00Z", 1.0),
        ]);
        let (url, server) = serve_once(200, body).await;
        let client = MetObs::builder().base_url(url).api_key("key").build()?;
        let summer_time = FixedOffset::east_opt(2 * 3600).unwrap();
        let station = StationId::new("06074")?;
        let period = ObservationPeriod::lookback(
            summer_time.with_ymd_and_hms(2021, 12, 1, 1, 0, 0).unwrap(),
            ChronoDuration::hours(4),
        );

        let series = client
            .observations()
            .station(&station)
            .parameter(&Parameter::TEMP_DRY)
            .period(period)
            .utc_offset(summer_time)
            .call()
            .await?;
        server.await?;

        let values: Vec<f64> = series.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        let first = series.first().unwrap().time;
        assert_eq!(first.offset(), &summer_time);
        assert_eq!(first.hour(), 0);
        assert!(!series.possibly_truncated());
        Ok(())
    }
}
