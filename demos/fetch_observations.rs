//! Fetches one day of station-level pressure for station 06184 (DMI, Copenhagen) and
//! prints it as a Polars DataFrame next to its hourly mean.

use chrono::{Duration, FixedOffset};
use metobs::{MetObs, MetObsError, ObservationPeriod, Parameter, Resampler, StationId, ToDataFrame};
use std::env;

#[tokio::main]
async fn main() -> Result<(), MetObsError> {
    configure_polars_display();
    let client = MetObs::builder()
        .maybe_api_key(env::var("DMI_API_KEY").ok())
        .build()?;

    // winter time
    let cet = FixedOffset::east_opt(3600).unwrap();
    let station = StationId::new("06184")?;
    let series = client
        .observations()
        .station(&station)
        .parameter(&Parameter::PRESSURE)
        .period(ObservationPeriod::last(Duration::days(1), cet))
        .utc_offset(cet)
        .call()
        .await?;

    let hourly = Resampler::hourly().resample(&series)?;

    println!("{:#?}", series.to_dataframe().map_err(metobs::ExportError::from)?);
    println!("{:#?}", hourly.to_dataframe().map_err(metobs::ExportError::from)?);

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 30 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "30");
}
