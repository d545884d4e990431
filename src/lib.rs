mod api;
mod error;
mod metobs;
mod pipeline;
#[cfg(feature = "plot")]
mod plot;
mod series;
mod types;
mod utils;

pub use error::MetObsError;
pub use metobs::*;
pub use pipeline::*;

pub use api::error::ObservationDataError;
pub use api::fetcher::{DEFAULT_BASE_URL, DEFAULT_LIMIT};
pub use api::response::{Feature, FeatureCollection, Geometry, Properties};

pub use series::error::{ExportError, ResampleError};
pub use series::export::{output_file_name, write_csv, CsvExporter};
pub use series::frame::{ToDataFrame, TIME_COLUMN};
pub use series::resample::{Aggregation, Bucket, ResampledSeries, Resampler};

#[cfg(feature = "plot")]
pub use plot::{comparison_frame, ComparisonPlot};

pub use types::observation::{Observation, ObservationSeries};
pub use types::parameter::Parameter;
pub use types::period::ObservationPeriod;
pub use types::station::StationId;
