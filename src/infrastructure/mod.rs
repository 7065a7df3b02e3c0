pub mod config;
pub mod confirmation_token;
pub mod database;
pub mod metrics;
pub mod telemetry;
