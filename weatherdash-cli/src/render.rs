//! Terminal summary of a dashboard view; the charts themselves are SVG files.

use std::path::Path;

use weatherdash_core::{
    DashboardView,
    dashboard::{DashboardPanel, Metrics},
};

use crate::plot::ChartFiles;

const RULE_WIDTH: usize = 48;
const NO_DATA: &str = "No data available";

pub fn render(view: &DashboardView, files: Option<&ChartFiles>) -> String {
    let mut out = match view {
        DashboardView::Ready(panel) => render_panel(panel, files),
        DashboardView::Error(msg) => format!("\n{msg}\n"),
    };

    out.push_str(&"─".repeat(RULE_WIDTH));
    out.push_str("\nData provided by OpenWeatherMap API\n");
    out
}

fn render_panel(panel: &DashboardPanel, files: Option<&ChartFiles>) -> String {
    let charts = &panel.charts;
    let mut out = format!(
        "\nWeather Data Dashboard: {} ({} days)\n{}\n",
        panel.city,
        panel.days,
        "─".repeat(RULE_WIDTH)
    );
    out.push_str(&render_metrics(&panel.metrics));

    let sections = [
        ("Temperature Trends", charts.temperature.is_empty(), files.map(|f| &f.temperature)),
        ("Weather Conditions Distribution", charts.conditions.is_empty(), files.map(|f| &f.conditions)),
        (
            "Humidity vs Pressure",
            charts.humidity_pressure.points.is_empty(),
            files.map(|f| &f.humidity_pressure),
        ),
    ];

    out.push('\n');
    for (title, empty, path) in sections {
        out.push_str(&chart_line(title, empty, path.map(|p| p.as_path())));
    }

    if let Some(t) = charts.humidity_pressure.trend {
        out.push_str(&format!(
            "  Trend line: pressure = {:.2} × humidity + {:.1}\n",
            t.slope, t.intercept
        ));
    }
    out
}

fn render_metrics(metrics: &Metrics) -> String {
    format!(
        "  Temperature {:.1}°C   Humidity {}%   Pressure {} hPa\n  {}: {}\n",
        metrics.temperature_c,
        metrics.humidity_pct,
        metrics.pressure_hpa,
        metrics.condition,
        metrics.description
    )
}

fn chart_line(title: &str, empty: bool, path: Option<&Path>) -> String {
    match (empty, path) {
        (true, Some(p)) => format!("  {title}: {NO_DATA} ({})\n", p.display()),
        (true, None) => format!("  {title}: {NO_DATA}\n"),
        (false, Some(p)) => format!("  {title}: {}\n", p.display()),
        (false, None) => format!("  {title}\n"),
    }
}
