use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    cache::WeatherCache,
    config::Config,
    error::WeatherError,
    model::{CurrentWeather, ForecastObservation},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Source of normalized weather records for the dashboard.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_current_weather(&self, city: &str) -> Result<CurrentWeather, WeatherError>;

    /// Returns at most `days * 8` forecast observations, in provider order.
    async fn get_historical_weather(
        &self,
        city: &str,
        days: u8,
    ) -> Result<Vec<ForecastObservation>, WeatherError>;
}

/// Connection settings fixed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), api_key: api_key.into() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Construct the provider from config, resolving the API key.
///
/// Fails with [`WeatherError::Configuration`] before any request is made if
/// no key is available.
pub fn provider_from_config(
    config: &Config,
    env_api_key: Option<String>,
    cache: WeatherCache,
) -> Result<OpenWeatherProvider, WeatherError> {
    let api_key = config.resolve_api_key(env_api_key)?;

    let mut settings = ProviderSettings::new(api_key);
    if let Some(base_url) = config.base_url.as_deref() {
        settings = settings.with_base_url(base_url);
    }

    Ok(OpenWeatherProvider::new(settings, cache))
}
