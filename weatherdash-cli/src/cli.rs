use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Password, Text, validator::Validation};
use tracing::warn;
use weatherdash_core::{
    Config, Dashboard, DashboardRequest, DashboardView, OpenWeatherProvider, Theme, WeatherCache,
    config::API_KEY_ENV,
    model::{MAX_DAYS, MIN_DAYS},
    provider_from_config,
};

use crate::{plot, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory the chart SVGs are written to.
    #[arg(long, global = true, default_value = "weatherdash-charts")]
    pub out_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,

    /// Render the dashboard once and exit.
    Show {
        /// City name, optionally "City,CountryCode".
        city: Option<String>,

        /// Forecast range in days.
        #[arg(long, short, value_parser = clap::value_parser!(u8).range(1..=7))]
        days: Option<u8>,

        /// Use the dark theme.
        #[arg(long)]
        dark: bool,
    },

    /// Interactive dashboard (default).
    Dashboard,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Dashboard) {
            Command::Configure => configure(),
            Command::Show { city, days, dark } => {
                let config = Config::load()?;
                let dashboard = build_dashboard(&config)?;

                let theme = if dark { Theme::Dark } else { Theme::Light };
                let request = DashboardRequest::new(
                    city.unwrap_or_else(|| config.default_city().to_string()),
                    days.unwrap_or_else(|| config.default_days()),
                    theme,
                );

                let view = dashboard.render(&request).await;
                present(&view, &self.out_dir);
                Ok(())
            }
            Command::Dashboard => {
                let config = Config::load()?;
                let dashboard = build_dashboard(&config)?;
                interactive(&dashboard, &config, &self.out_dir).await
            }
        }
    }
}

/// Resolves the API key before anything else; a missing key stops here.
fn build_dashboard(config: &Config) -> anyhow::Result<Dashboard<OpenWeatherProvider>> {
    let provider = provider_from_config(config, std::env::var(API_KEY_ENV).ok(), WeatherCache::new())?;
    Ok(Dashboard::new(provider))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_help_message("Get a free API key from https://openweathermap.org/")
        .with_validator(|key: &str| {
            if key.trim().is_empty() {
                Ok(Validation::Invalid("API key must not be empty".into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()?;

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn interactive(
    dashboard: &Dashboard<OpenWeatherProvider>,
    config: &Config,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let mut request =
        DashboardRequest::new(config.default_city(), config.default_days(), Theme::Light);

    loop {
        request = match prompt_request(&request) {
            Ok(next) => next,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let view = dashboard.render(&request).await;
        present(&view, out_dir);

        match Confirm::new("Show another city or range?").with_default(true).prompt() {
            Ok(true) => continue,
            Ok(false) | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Writes the charts for a ready view, then prints the summary.
fn present(view: &DashboardView, out_dir: &Path) {
    let files = match view {
        DashboardView::Ready(panel) => {
            match plot::write_charts(out_dir, &panel.charts, panel.theme) {
                Ok(files) => Some(files),
                Err(e) => {
                    warn!(error = %e, "Failed to write charts");
                    None
                }
            }
        }
        DashboardView::Error(_) => None,
    };
    print!("{}", render::render(view, files.as_ref()));
}

fn prompt_request(previous: &DashboardRequest) -> Result<DashboardRequest, InquireError> {
    let city = Text::new("City:").with_default(&previous.city).prompt()?;
    let city = match city.trim() {
        "" => previous.city.clone(),
        trimmed => trimmed.to_string(),
    };

    let days = CustomType::<u8>::new("Days range:")
        .with_default(previous.days)
        .with_help_message("Number of forecast days, 1 to 7")
        .with_validator(|days: &u8| {
            if (MIN_DAYS..=MAX_DAYS).contains(days) {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(format!("Pick between {MIN_DAYS} and {MAX_DAYS} days").into()))
            }
        })
        .prompt()?;

    let dark = Confirm::new("Dark mode?").with_default(previous.theme == Theme::Dark).prompt()?;
    let theme = if dark { Theme::Dark } else { Theme::Light };

    Ok(DashboardRequest::new(city, days, theme))
}
