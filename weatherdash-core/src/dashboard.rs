//! One render cycle of the dashboard.
//!
//! The dashboard is the top-level catch point: request-time errors from the
//! provider end up as an inline message, and the next cycle starts clean.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    charts::ChartSet,
    error::WeatherError,
    model::{CurrentWeather, DashboardRequest, Theme},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub condition: String,
    pub description: String,
}

impl From<CurrentWeather> for Metrics {
    fn from(current: CurrentWeather) -> Self {
        Self {
            temperature_c: current.temperature_c,
            humidity_pct: current.humidity_pct,
            pressure_hpa: current.pressure_hpa,
            condition: current.condition,
            description: current.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPanel {
    pub city: String,
    pub days: u8,
    pub theme: Theme,
    pub metrics: Metrics,
    pub charts: ChartSet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DashboardView {
    Ready(Box<DashboardPanel>),
    /// Inline message shown instead of the panel.
    Error(String),
}

impl DashboardView {
    pub fn is_ready(&self) -> bool {
        matches!(self, DashboardView::Ready(_))
    }
}

#[derive(Debug)]
pub struct Dashboard<P> {
    provider: P,
}

impl<P: WeatherProvider> Dashboard<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch current conditions and the forecast window, then derive the charts.
    pub async fn render(&self, request: &DashboardRequest) -> DashboardView {
        match self.build_panel(request).await {
            Ok(panel) => {
                info!(city = %request.city, days = request.days, "Dashboard rendered");
                DashboardView::Ready(Box::new(panel))
            }
            Err(err) => {
                warn!(city = %request.city, error = %err, "Dashboard render failed");
                DashboardView::Error(format!("Error occurred: {err}"))
            }
        }
    }

    async fn build_panel(&self, request: &DashboardRequest) -> Result<DashboardPanel, WeatherError> {
        let current = self.provider.get_current_weather(&request.city).await?;
        let forecast = self.provider.get_historical_weather(&request.city, request.days).await?;

        Ok(DashboardPanel {
            city: request.city.clone(),
            days: request.days,
            theme: request.theme,
            metrics: current.into(),
            charts: ChartSet::from_observations(&forecast),
        })
    }
}
