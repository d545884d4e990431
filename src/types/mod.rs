pub mod observation;
pub mod parameter;
pub mod period;
pub mod station;
