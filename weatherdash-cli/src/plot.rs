//! SVG figures for the three dashboard charts, drawn with `plotters`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime};
use plotters::{
    coord::{Shift, types::RangedDateTime},
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use weatherdash_core::{
    Theme,
    charts::{ChartSet, ConditionCount, HumidityPressure, TemperaturePoint},
};

const WIDE: (u32, u32) = (1000, 600);
const SQUARE: (u32, u32) = (800, 600);
const NO_DATA: &str = "No data available";

pub const TEMPERATURE_FILE: &str = "temperature.svg";
pub const CONDITIONS_FILE: &str = "conditions.svg";
pub const HUMIDITY_PRESSURE_FILE: &str = "humidity_pressure.svg";

/// Colours for one theme.
struct Palette {
    background: RGBColor,
    foreground: RGBColor,
    series: RGBColor,
    trend: RGBColor,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                background: WHITE,
                foreground: BLACK,
                series: RGBColor(0x1f, 0x77, 0xb4),
                trend: RED,
            },
            Theme::Dark => Palette {
                background: RGBColor(0x0e, 0x11, 0x17),
                foreground: RGBColor(0xfa, 0xfa, 0xfa),
                series: RGBColor(0x4c, 0xc9, 0xf0),
                trend: RGBColor(0xff, 0x6b, 0x6b),
            },
        }
    }

    fn text(&self, size: u32) -> TextStyle<'static> {
        ("sans-serif", size).into_font().color(&self.foreground)
    }
}

#[derive(Debug, Clone)]
pub struct ChartFiles {
    pub temperature: PathBuf,
    pub conditions: PathBuf,
    pub humidity_pressure: PathBuf,
}

/// Write all three figures into `dir`, replacing earlier ones.
pub fn write_charts(dir: &Path, charts: &ChartSet, theme: Theme) -> Result<ChartFiles> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory: {}", dir.display()))?;

    let files = ChartFiles {
        temperature: dir.join(TEMPERATURE_FILE),
        conditions: dir.join(CONDITIONS_FILE),
        humidity_pressure: dir.join(HUMIDITY_PRESSURE_FILE),
    };

    let palette = Palette::for_theme(theme);
    write_svg(&files.temperature, temperature_svg(&charts.temperature, &palette)?)?;
    write_svg(&files.conditions, conditions_svg(&charts.conditions, &palette)?)?;
    write_svg(&files.humidity_pressure, humidity_pressure_svg(&charts.humidity_pressure, &palette)?)?;

    Ok(files)
}

fn write_svg(path: &Path, svg: String) -> Result<()> {
    fs::write(path, svg).with_context(|| format!("Failed to write chart: {}", path.display()))
}

fn no_data(root: &DrawingArea<SVGBackend<'_>, Shift>, palette: &Palette, size: (u32, u32)) -> Result<()> {
    let style = palette.text(24).pos(Pos::new(HPos::Center, VPos::Center));
    let center = (size.0 as i32 / 2, size.1 as i32 / 2);
    root.draw(&Text::new(NO_DATA, center, style))?;
    Ok(())
}

fn temperature_svg(points: &[TemperaturePoint], palette: &Palette) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, WIDE).into_drawing_area();
        root.fill(&palette.background)?;

        if points.is_empty() {
            no_data(&root, palette, WIDE)?;
        } else {
            let data: Vec<(NaiveDateTime, f64)> = points
                .iter()
                .map(|p| (p.time.with_timezone(&Local).naive_local(), p.temperature_c))
                .collect();

            let (mut min_dt, mut max_dt) = data
                .iter()
                .fold((data[0].0, data[0].0), |(min, max), (dt, _)| (min.min(*dt), max.max(*dt)));
            if min_dt == max_dt {
                min_dt -= Duration::hours(3);
                max_dt += Duration::hours(3);
            }

            let (y_start, y_end) = padded(data.iter().map(|&(_, t)| t));

            let mut chart = ChartBuilder::on(&root)
                .caption("Temperature Trend Over Time", palette.text(28))
                .margin(20)
                .x_label_area_size(60)
                .y_label_area_size(60)
                .build_cartesian_2d(RangedDateTime::from(min_dt..max_dt), y_start..y_end)?;

            chart
                .configure_mesh()
                .x_desc("Date and Time")
                .y_desc("Temperature (°C)")
                .x_label_formatter(&|dt: &NaiveDateTime| dt.format("%d %b %H:%M").to_string())
                .axis_style(palette.foreground)
                .label_style(palette.text(14))
                .axis_desc_style(palette.text(16))
                .bold_line_style(palette.foreground.mix(0.3))
                .light_line_style(palette.foreground.mix(0.1))
                .draw()?;

            chart.draw_series(AreaSeries::new(data.iter().copied(), y_start, palette.series.mix(0.2)))?;
            chart.draw_series(LineSeries::new(data.iter().copied(), palette.series.stroke_width(2)))?;
            chart.draw_series(
                data.iter().map(|&point| Circle::new(point, 4, palette.series.filled())),
            )?;
        }

        root.present()?;
    }
    Ok(svg)
}

fn conditions_svg(counts: &[ConditionCount], palette: &Palette) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SQUARE).into_drawing_area();
        root.fill(&palette.background)?;

        if counts.is_empty() {
            no_data(&root, palette, SQUARE)?;
        } else {
            let labels: Vec<&str> = counts.iter().map(|c| c.condition.as_str()).collect();
            let max = counts.iter().map(|c| c.count).max().unwrap_or(1) as u32;

            let mut chart = ChartBuilder::on(&root)
                .caption("Distribution of Weather Conditions", palette.text(24))
                .margin(20)
                .x_label_area_size(60)
                .y_label_area_size(50)
                .build_cartesian_2d((0..labels.len() as i32).into_segmented(), 0u32..max + 1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(labels.len())
                .x_desc("Weather Condition")
                .y_desc("Frequency")
                .x_label_formatter(&|v: &SegmentValue<i32>| match v {
                    SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                        labels.get(*i as usize).map(|s| s.to_string()).unwrap_or_default()
                    }
                    SegmentValue::Last => String::new(),
                })
                .axis_style(palette.foreground)
                .label_style(palette.text(14))
                .axis_desc_style(palette.text(16))
                .bold_line_style(palette.foreground.mix(0.3))
                .light_line_style(palette.foreground.mix(0.1))
                .draw()?;

            chart.draw_series(
                Histogram::vertical(&chart)
                    .style(palette.series.filled())
                    .margin(10)
                    .data(counts.iter().enumerate().map(|(i, c)| (i as i32, c.count as u32))),
            )?;

            // Value labels on top of each bar.
            let label_style = palette.text(14).pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(counts.iter().enumerate().map(|(i, c)| {
                Text::new(
                    c.count.to_string(),
                    (SegmentValue::CenterOf(i as i32), c.count as u32),
                    label_style.clone(),
                )
            }))?;
        }

        root.present()?;
    }
    Ok(svg)
}

fn humidity_pressure_svg(data: &HumidityPressure, palette: &Palette) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SQUARE).into_drawing_area();
        root.fill(&palette.background)?;

        if data.points.is_empty() {
            no_data(&root, palette, SQUARE)?;
        } else {
            let points: Vec<(f64, f64)> =
                data.points.iter().map(|&(h, p)| (f64::from(h), f64::from(p))).collect();
            let (x_start, x_end) = padded(points.iter().map(|&(h, _)| h));
            let (y_start, y_end) = padded(points.iter().map(|&(_, p)| p));

            let mut chart = ChartBuilder::on(&root)
                .caption("Humidity vs Pressure Correlation", palette.text(24))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(x_start..x_end, y_start..y_end)?;

            chart
                .configure_mesh()
                .x_desc("Humidity (%)")
                .y_desc("Pressure (hPa)")
                .axis_style(palette.foreground)
                .label_style(palette.text(14))
                .axis_desc_style(palette.text(16))
                .bold_line_style(palette.foreground.mix(0.3))
                .light_line_style(palette.foreground.mix(0.1))
                .draw()?;

            chart.draw_series(
                points.iter().map(|&point| Circle::new(point, 6, palette.series.mix(0.6).filled())),
            )?;

            if let Some(trend) = data.trend {
                let trend_color = palette.trend;
                chart
                    .draw_series(LineSeries::new(
                        [(x_start, trend.at(x_start)), (x_end, trend.at(x_end))],
                        trend_color.stroke_width(2),
                    ))?
                    .label("Trend line")
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], trend_color));

                chart
                    .configure_series_labels()
                    .label_font(palette.text(14))
                    .background_style(palette.background.mix(0.8))
                    .border_style(palette.foreground)
                    .draw()?;
            }
        }

        root.present()?;
    }
    Ok(svg)
}

/// Axis range around `values` with 10% padding, or ±1 when they are all equal.
fn padded(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) =
        values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = if (max - min).abs() > 1e-6 { (max - min) * 0.1 } else { 1.0 };
    (min - pad, max + pad)
}
