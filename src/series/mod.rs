pub mod error;
pub mod export;
pub mod frame;
pub mod resample;
