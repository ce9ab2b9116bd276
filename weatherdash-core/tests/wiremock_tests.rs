//! Integration tests for the OpenWeather client using wiremock
//!
//! These tests mock the provider API to verify request shape, normalization,
//! caching and error mapping without hitting the network.

use std::{sync::Arc, time::Duration};

use weatherdash_core::{
    Config, Dashboard, DashboardRequest, DashboardView, ManualClock, OpenWeatherProvider,
    ProviderSettings, Theme, WeatherCache, WeatherError, WeatherProvider, provider_from_config,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn current_response(temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": -0.1257, "lat": 51.5085 },
        "weather": [{ "id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d" }],
        "main": { "temp": temp, "feels_like": 11.2, "pressure": 1018, "humidity": 72 },
        "name": "London",
        "cod": 200
    })
}

fn forecast_response(entries: usize) -> serde_json::Value {
    let list: Vec<_> = (0..entries)
        .map(|i| {
            let dt = 1_717_200_000 + (i as i64) * 10_800;
            let temp = 12.0 + (i as f64) * 0.5;
            let condition = if i % 3 == 0 { "Rain" } else { "Clouds" };
            serde_json::json!({
                "dt": dt,
                "main": { "temp": temp, "humidity": 60 + (i % 10), "pressure": 1010 + i },
                "weather": [{ "main": condition, "description": "n/a" }],
                "dt_txt": "ignored"
            })
        })
        .collect();

    serde_json::json!({ "cod": "200", "cnt": entries, "list": list, "city": { "name": "London" } })
}

fn create_provider(mock_server: &MockServer, cache: WeatherCache) -> OpenWeatherProvider {
    let settings = ProviderSettings::new("test-key").with_base_url(mock_server.uri());
    OpenWeatherProvider::new(settings, cache)
}

async fn mount_current(mock_server: &MockServer, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

async fn mount_forecast(mock_server: &MockServer, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

// =============================================================================
// Current weather
// =============================================================================

#[tokio::test]
async fn current_weather_sends_metric_query_and_rounds_temperature() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London,GB"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response(12.347)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = create_provider(&mock_server, WeatherCache::new());
    let current = provider.get_current_weather("London,GB").await.unwrap();

    assert_eq!(current.temperature_c, 12.3);
    assert_eq!(current.humidity_pct, 72);
    assert_eq!(current.pressure_hpa, 1018);
    assert_eq!(current.condition, "Clouds");
    assert_eq!(current.description, "overcast clouds");
}

#[tokio::test]
async fn repeated_current_call_within_ttl_is_served_from_cache() {
    let mock_server = MockServer::start().await;
    mount_current(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(current_response(9.0)),
        1,
    )
    .await;

    let clock = Arc::new(ManualClock::new());
    let provider = create_provider(&mock_server, WeatherCache::with_clock(clock.clone()));

    let first = provider.get_current_weather("London").await.unwrap();
    clock.advance(Duration::from_secs(599));
    let second = provider.get_current_weather("London").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn current_call_after_ttl_hits_the_network_again() {
    let mock_server = MockServer::start().await;
    mount_current(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(current_response(9.0)),
        2,
    )
    .await;

    let clock = Arc::new(ManualClock::new());
    let provider = create_provider(&mock_server, WeatherCache::with_clock(clock.clone()));

    provider.get_current_weather("London").await.unwrap();
    clock.advance(Duration::from_secs(601));
    provider.get_current_weather("London").await.unwrap();
}

#[tokio::test]
async fn unknown_city_404_is_fetch_error() {
    let mock_server = MockServer::start().await;
    mount_current(
        &mock_server,
        ResponseTemplate::new(404)
            .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        1,
    )
    .await;

    let provider = create_provider(&mock_server, WeatherCache::new());
    let err = provider.get_current_weather("Nonexistentville").await.unwrap_err();

    assert!(err.is_fetch(), "expected fetch error, got: {err:?}");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert!(err.to_string().contains("city not found"));
}

#[tokio::test]
async fn missing_main_temp_is_data_format_error() {
    let mock_server = MockServer::start().await;
    mount_current(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "weather": [{ "main": "Clear", "description": "clear sky" }],
            "main": { "humidity": 40, "pressure": 1021 }
        })),
        1,
    )
    .await;

    let provider = create_provider(&mock_server, WeatherCache::new());
    let err = provider.get_current_weather("London").await.unwrap_err();

    assert!(err.is_data_format(), "expected data format error, got: {err:?}");
    assert!(err.to_string().contains("temp"));
}

#[tokio::test]
async fn non_json_body_is_data_format_error() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, ResponseTemplate::new(200).set_body_string("<html>"), 1).await;

    let provider = create_provider(&mock_server, WeatherCache::new());
    let err = provider.get_current_weather("London").await.unwrap_err();
    assert!(err.is_data_format());
}

#[tokio::test]
async fn failed_fetch_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_current(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(current_response(5.0)),
        1,
    )
    .await;

    let provider = create_provider(&mock_server, WeatherCache::new());

    assert!(provider.get_current_weather("London").await.is_err());
    assert!(provider.get_current_weather("London").await.is_ok());
}

#[tokio::test]
async fn unreachable_provider_is_fetch_error() {
    let settings = ProviderSettings::new("test-key").with_base_url("http://127.0.0.1:1");
    let provider = OpenWeatherProvider::new(settings, WeatherCache::new());

    let err = provider.get_current_weather("London").await.unwrap_err();
    assert!(err.is_fetch());
    assert_eq!(err.status(), None);
    assert!(!err.to_string().contains("test-key"));
}

// =============================================================================
// Forecast
// =============================================================================

#[tokio::test]
async fn forecast_is_truncated_to_days_and_chronological() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "London"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response(20)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = create_provider(&mock_server, WeatherCache::new());
    let obs = provider.get_historical_weather("London", 2).await.unwrap();

    assert_eq!(obs.len(), 16);
    assert!(obs.windows(2).all(|w| w[0].time < w[1].time));
    assert_eq!(obs[0].time.timestamp(), 1_717_200_000);
    assert_eq!(obs[0].time.to_rfc3339(), "2024-06-01T00:00:00+00:00");
    assert_eq!(obs[0].condition, "Rain");
    assert_eq!(obs[1].temperature_c, 12.5);
}

#[tokio::test]
async fn forecast_length_is_min_of_window_and_provider_list() {
    let mock_server = MockServer::start().await;
    mount_forecast(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(forecast_response(40)),
        7,
    )
    .await;

    let provider = create_provider(&mock_server, WeatherCache::new());
    for days in 1..=7u8 {
        let obs = provider.get_historical_weather("London", days).await.unwrap();
        assert_eq!(obs.len(), (usize::from(days) * 8).min(40));
    }
}

#[tokio::test]
async fn overlapping_day_ranges_are_cached_independently() {
    let mock_server = MockServer::start().await;
    mount_forecast(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(forecast_response(40)),
        2,
    )
    .await;

    let provider = create_provider(&mock_server, WeatherCache::new());
    let three = provider.get_historical_weather("London", 3).await.unwrap();
    let five = provider.get_historical_weather("London", 5).await.unwrap();
    let three_again = provider.get_historical_weather("London", 3).await.unwrap();

    assert_eq!(three.len(), 24);
    assert_eq!(five.len(), 40);
    assert_eq!(three, three_again);
    assert_eq!(provider.cache().forecast.len(), 2);
}

#[tokio::test]
async fn forecast_cache_expires_after_an_hour() {
    let mock_server = MockServer::start().await;
    mount_forecast(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(forecast_response(8)),
        2,
    )
    .await;

    let clock = Arc::new(ManualClock::new());
    let provider = create_provider(&mock_server, WeatherCache::with_clock(clock.clone()));

    provider.get_historical_weather("London", 1).await.unwrap();
    clock.advance(Duration::from_secs(3599));
    provider.get_historical_weather("London", 1).await.unwrap();
    clock.advance(Duration::from_secs(2));
    provider.get_historical_weather("London", 1).await.unwrap();
}

#[tokio::test]
async fn broken_entry_after_the_window_does_not_reject_the_forecast() {
    let mock_server = MockServer::start().await;

    let mut body = forecast_response(8);
    body["list"].as_array_mut().unwrap().push(serde_json::json!({
        "dt": 1_717_286_400,
        "main": { "humidity": 61, "pressure": 1019 },
        "weather": [{ "main": "Rain" }]
    }));
    mount_forecast(&mock_server, ResponseTemplate::new(200).set_body_json(body), 1).await;

    let provider = create_provider(&mock_server, WeatherCache::new());
    let obs = provider.get_historical_weather("London", 1).await.unwrap();

    assert_eq!(obs.len(), 8);
}

#[tokio::test]
async fn forecast_without_list_is_data_format_error() {
    let mock_server = MockServer::start().await;
    mount_forecast(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cod": "200" })),
        1,
    )
    .await;

    let provider = create_provider(&mock_server, WeatherCache::new());
    let err = provider.get_historical_weather("London", 5).await.unwrap_err();
    assert!(err.is_data_format());
}

// =============================================================================
// Configuration & dashboard
// =============================================================================

#[tokio::test]
async fn missing_api_key_never_reaches_the_provider() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, ResponseTemplate::new(200), 0).await;
    mount_forecast(&mock_server, ResponseTemplate::new(200), 0).await;

    let cfg = Config { base_url: Some(mock_server.uri()), ..Default::default() };
    let err = provider_from_config(&cfg, None, WeatherCache::new()).unwrap_err();

    assert!(matches!(err, WeatherError::Configuration(_)));
}

#[tokio::test]
async fn dashboard_shows_inline_error_then_recovers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Nonexistentville"))
        .respond_with(ResponseTemplate::new(404).set_body_string("city not found"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response(18.04)))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_forecast(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(forecast_response(40)),
        1,
    )
    .await;

    let dashboard = Dashboard::new(create_provider(&mock_server, WeatherCache::new()));

    let view = dashboard
        .render(&DashboardRequest::new("Nonexistentville", 5, Theme::Light))
        .await;
    assert!(matches!(view, DashboardView::Error(ref msg) if msg.contains("404")));

    let view = dashboard.render(&DashboardRequest::new("London", 5, Theme::Light)).await;
    let DashboardView::Ready(panel) = view else {
        panic!("expected ready view after recovery");
    };
    assert_eq!(panel.metrics.temperature_c, 18.0);
    assert_eq!(panel.charts.temperature.len(), 40);
}
