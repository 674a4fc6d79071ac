// camtrap-api: Async Rust client for the Open-Meteo hourly forecast API

pub mod error;
pub mod forecast;
pub mod transport;

pub use error::Error;
pub use forecast::{ForecastClient, HourlyForecast, HourlyRecord, HOURLY_VARIABLES};
pub use transport::TransportConfig;
