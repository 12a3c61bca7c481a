pub mod clients;
pub mod configuration;
pub mod domain;
pub mod telemetry;
pub mod utils;
