//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - The OpenWeatherMap client and its normalized records
//! - Time-boxed response caching
//! - Configuration & API key resolution
//! - Chart datasets and the per-interaction dashboard cycle
//!
//! It is used by `weatherdash-cli`, but can also be reused by other front ends.

pub mod cache;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod provider;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache, WeatherCache};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardView};
pub use error::{Endpoint, FetchCause, WeatherError};
pub use model::{CurrentWeather, DashboardRequest, ForecastObservation, Theme};
pub use provider::{
    ProviderSettings, WeatherProvider, openweather::OpenWeatherProvider, provider_from_config,
};
