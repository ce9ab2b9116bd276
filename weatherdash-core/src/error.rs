use reqwest::StatusCode;
use thiserror::Error;

/// Provider endpoint a request was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Current => f.write_str("current weather"),
            Endpoint::Forecast => f.write_str("forecast"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Missing or unusable API key. Fatal at startup.
    #[error("{0}")]
    Configuration(String),

    /// Transport failure or non-success response.
    #[error("Failed to fetch {endpoint}: {cause}")]
    Fetch {
        endpoint: Endpoint,
        #[source]
        cause: FetchCause,
    },

    /// Provider answered, but not in the expected shape.
    #[error("Unexpected {endpoint} response format: {detail}")]
    DataFormat { endpoint: Endpoint, detail: String },
}

impl WeatherError {
    pub fn is_fetch(&self) -> bool {
        matches!(self, WeatherError::Fetch { .. })
    }

    pub fn is_data_format(&self) -> bool {
        matches!(self, WeatherError::DataFormat { .. })
    }

    /// HTTP status of a rejected request, if the provider answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            WeatherError::Fetch { cause: FetchCause::Status { status, .. }, .. } => Some(*status),
            _ => None,
        }
    }
}
