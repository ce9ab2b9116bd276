use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    cache::WeatherCache,
    error::{Endpoint, FetchCause, WeatherError},
    model::{CurrentWeather, ForecastObservation, OBSERVATIONS_PER_DAY, round_one_decimal},
};

use super::{ProviderSettings, WeatherProvider};

/// OpenWeatherMap client with per-operation response caching.
#[derive(Debug)]
pub struct OpenWeatherProvider {
    settings: ProviderSettings,
    http: Client,
    cache: WeatherCache,
}

impl OpenWeatherProvider {
    pub fn new(settings: ProviderSettings, cache: WeatherCache) -> Self {
        Self { settings, http: Client::new(), cache }
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        city: &str,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.settings.base_url, endpoint.path());
        debug!(%endpoint, city, "Requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.settings.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| transport_error(endpoint, e))?;

        if !status.is_success() {
            return Err(WeatherError::Fetch {
                endpoint,
                cause: FetchCause::Status { status, body: truncate_body(&body) },
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::DataFormat { endpoint, detail: e.to_string() })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn get_current_weather(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let key = city.to_string();
        if let Some(hit) = self.cache.current.get(&key) {
            return Ok(hit);
        }

        let parsed: OwCurrentResponse = self.fetch(Endpoint::Current, city).await?;
        let current = normalize_current(parsed)?;

        self.cache.current.insert(key, current.clone());
        Ok(current)
    }

    #[instrument(skip(self))]
    async fn get_historical_weather(
        &self,
        city: &str,
        days: u8,
    ) -> Result<Vec<ForecastObservation>, WeatherError> {
        let key = (city.to_string(), days);
        if let Some(hit) = self.cache.forecast.get(&key) {
            return Ok(hit);
        }

        let parsed: OwForecastResponse = self.fetch(Endpoint::Forecast, city).await?;
        let observations = normalize_forecast(parsed, days)?;
        debug!(count = observations.len(), "Normalized forecast");

        self.cache.forecast.insert(key, observations.clone());
        Ok(observations)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwCondition>,
}

/// Entries stay raw until truncation; only the kept window is decoded.
#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<serde_json::Value>,
}

fn normalize_current(parsed: OwCurrentResponse) -> Result<CurrentWeather, WeatherError> {
    let weather = parsed.weather.into_iter().next().ok_or_else(|| WeatherError::DataFormat {
        endpoint: Endpoint::Current,
        detail: "`weather` array is empty".to_string(),
    })?;

    Ok(CurrentWeather {
        temperature_c: round_one_decimal(parsed.main.temp),
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        condition: weather.main,
        description: weather.description,
    })
}

fn normalize_forecast(
    parsed: OwForecastResponse,
    days: u8,
) -> Result<Vec<ForecastObservation>, WeatherError> {
    let limit = usize::from(days).saturating_mul(OBSERVATIONS_PER_DAY);

    parsed
        .list
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, raw)| {
            let entry: OwForecastEntry =
                serde_json::from_value(raw).map_err(|e| WeatherError::DataFormat {
                    endpoint: Endpoint::Forecast,
                    detail: format!("list[{idx}]: {e}"),
                })?;

            let time = unix_to_utc(entry.dt).ok_or_else(|| WeatherError::DataFormat {
                endpoint: Endpoint::Forecast,
                detail: format!("list[{idx}].dt {} is not a valid timestamp", entry.dt),
            })?;

            let condition =
                entry.weather.into_iter().next().ok_or_else(|| WeatherError::DataFormat {
                    endpoint: Endpoint::Forecast,
                    detail: format!("list[{idx}].weather array is empty"),
                })?;

            Ok(ForecastObservation {
                time,
                temperature_c: entry.main.temp,
                humidity_pct: entry.main.humidity,
                pressure_hpa: entry.main.pressure,
                condition: condition.main,
            })
        })
        .collect()
}

fn transport_error(endpoint: Endpoint, err: reqwest::Error) -> WeatherError {
    // The request URL carries the API key.
    WeatherError::Fetch { endpoint, cause: FetchCause::Transport(err.without_url()) }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
