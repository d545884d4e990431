//! demos/temperature_pipeline.rs
//!
//! Downloads the last two days of dry-bulb temperature for station 06074 (Århus Syd),
//! resamples the 10-minute observations to hourly means shifted by 25 minutes, writes both
//! series to CSV files and renders a comparison plot.
//!
//! To run this example:
//! DMI_API_KEY=<your key> cargo run --example temperature_pipeline

use chrono::{Duration, FixedOffset};
use metobs::{MetObs, Parameter, Pipeline, PipelineConfig, Resampler, StationId};
use std::env;
use std::error::Error;

// Edit these to change what is downloaded.
const STATION: &str = "06074";
const LOOKBACK_DAYS: i64 = 2;
// 2 h = Danish summer time, 1 h = Danish winter time
const UTC_TO_LOCAL_HOURS: i32 = 2;
const RESAMPLE_OFFSET_MINUTES: i64 = 25;
const RESAMPLED_COLUMN: &str = "temp_dry_downsample";
const OUTPUT_DIR: &str = "data";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let client = MetObs::builder()
        .maybe_api_key(env::var("DMI_API_KEY").ok())
        .build()?;

    let utc_offset = FixedOffset::east_opt(UTC_TO_LOCAL_HOURS * 3600).ok_or("invalid UTC offset")?;
    let config = PipelineConfig::builder()
        .station(StationId::new(STATION)?)
        .parameter(Parameter::TEMP_DRY)
        .lookback(Duration::days(LOOKBACK_DAYS))
        .utc_offset(utc_offset)
        .resampler(Resampler::hourly().with_offset(Duration::minutes(RESAMPLE_OFFSET_MINUTES)))
        .resampled_column(RESAMPLED_COLUMN)
        .output_dir(OUTPUT_DIR)
        .open_plot(true)
        .build();

    let report = Pipeline::new(client, config).run().await?;

    println!("Period:    {}", report.period);
    println!("Raw:       {} rows -> {}", report.raw_rows, report.raw_path.display());
    println!(
        "Resampled: {} rows -> {}",
        report.resampled_rows,
        report.resampled_path.display()
    );
    if let Some(plot) = &report.plot_path {
        println!("Plot:      {}", plot.display());
    }
    if report.possibly_truncated {
        println!("Warning: the request limit was reached, raise it to get the full period.");
    }
    Ok(())
}
