pub mod alerts;
pub mod config;
pub mod error;
pub mod gateways;
pub mod geo;
pub mod telemetry;
