use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CITY: &str = "London";
pub const DEFAULT_DAYS: u8 = 5;
pub const MIN_DAYS: u8 = 1;
pub const MAX_DAYS: u8 = 7;

/// The provider reports forecasts on a fixed 3-hour cadence.
pub const OBSERVATIONS_PER_DAY: usize = 8;

/// Snapshot of the current conditions for one city, metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Degrees Celsius, rounded to one decimal place.
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    /// Short category label, e.g. "Clouds".
    pub condition: String,
    pub description: String,
}

/// One 3-hourly point of the forecast window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastObservation {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub condition: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Inputs collected from the user for one render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub city: String,
    pub days: u8,
    pub theme: Theme,
}

impl DashboardRequest {
    /// Builds a request, clamping `days` into the slider range.
    pub fn new(city: impl Into<String>, days: u8, theme: Theme) -> Self {
        Self {
            city: city.into(),
            days: days.clamp(MIN_DAYS, MAX_DAYS),
            theme,
        }
    }
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self::new(DEFAULT_CITY, DEFAULT_DAYS, Theme::default())
    }
}

/// Rounds to a single decimal place, ties to even.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round_one_decimal(12.36), 12.4);
        assert_eq!(round_one_decimal(12.34), 12.3);
        assert_eq!(round_one_decimal(-3.06), -3.1);
        assert_eq!(round_one_decimal(7.0), 7.0);
    }

    #[test]
    fn exact_ties_round_to_even() {
        assert_eq!(round_one_decimal(0.25), 0.2);
        assert_eq!(round_one_decimal(0.75), 0.8);
        assert_eq!(round_one_decimal(-0.25), -0.2);
    }

    #[test]
    fn request_defaults_match_dashboard_controls() {
        let req = DashboardRequest::default();
        assert_eq!(req.city, "London");
        assert_eq!(req.days, 5);
        assert_eq!(req.theme, Theme::Light);
    }

    #[test]
    fn request_clamps_days_into_slider_range() {
        assert_eq!(DashboardRequest::new("Oslo", 0, Theme::Dark).days, 1);
        assert_eq!(DashboardRequest::new("Oslo", 12, Theme::Dark).days, 7);
        assert_eq!(DashboardRequest::new("Oslo", 3, Theme::Dark).days, 3);
    }
}
