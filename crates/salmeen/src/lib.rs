pub mod config;
pub mod error;
pub mod safety;
pub mod telemetry;
