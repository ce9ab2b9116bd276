//! Chart datasets derived from forecast observations.
//!
//! Nothing here draws anything; the datasets are handed to whatever renders
//! the dashboard. Empty input always produces empty datasets so the renderer
//! can fall back to a "No data available" placeholder.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ForecastObservation;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperaturePoint {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionCount {
    pub condition: String,
    pub count: usize,
}

/// Least-squares fit `pressure = slope * humidity + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn at(&self, humidity: f64) -> f64 {
        self.slope * humidity + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HumidityPressure {
    /// `(humidity %, pressure hPa)` pairs in observation order.
    pub points: Vec<(u8, u32)>,
    pub trend: Option<TrendLine>,
}

/// All three chart datasets for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub temperature: Vec<TemperaturePoint>,
    pub conditions: Vec<ConditionCount>,
    pub humidity_pressure: HumidityPressure,
}

impl ChartSet {
    pub fn from_observations(observations: &[ForecastObservation]) -> Self {
        Self {
            temperature: temperature_trend(observations),
            conditions: condition_distribution(observations),
            humidity_pressure: humidity_pressure(observations),
        }
    }
}

pub fn temperature_trend(observations: &[ForecastObservation]) -> Vec<TemperaturePoint> {
    observations
        .iter()
        .map(|o| TemperaturePoint { time: o.time, temperature_c: o.temperature_c })
        .collect()
}

/// Counts condition labels, keeping the order in which they first appear.
pub fn condition_distribution(observations: &[ForecastObservation]) -> Vec<ConditionCount> {
    let mut counts: Vec<ConditionCount> = Vec::new();

    for obs in observations {
        match counts.iter_mut().find(|c| c.condition == obs.condition) {
            Some(existing) => existing.count += 1,
            None => counts.push(ConditionCount { condition: obs.condition.clone(), count: 1 }),
        }
    }

    counts
}

pub fn humidity_pressure(observations: &[ForecastObservation]) -> HumidityPressure {
    let points: Vec<(u8, u32)> =
        observations.iter().map(|o| (o.humidity_pct, o.pressure_hpa)).collect();
    let trend = fit_line(&points);

    HumidityPressure { points, trend }
}

fn fit_line(points: &[(u8, u32)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|&(x, _)| f64::from(x)).sum::<f64>() / n;
    let mean_y = points.iter().map(|&(_, y)| f64::from(y)).sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for &(x, y) in points {
        let dx = f64::from(x) - mean_x;
        sxy += dx * (f64::from(y) - mean_y);
        sxx += dx * dx;
    }

    // All humidity values equal: the line is vertical.
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some(TrendLine { slope, intercept: mean_y - slope * mean_x })
}
