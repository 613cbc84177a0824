use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the core building blocks (credentials, cities, provider, cache).
///
/// Orchestration layers wrap these in `anyhow::Error` with extra context.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Credential file {path} is malformed: {reason}")]
    MalformedCredentials { path: PathBuf, reason: String },

    #[error("API key must be exactly {expected} characters, got {actual}")]
    InvalidApiKey { expected: usize, actual: usize },

    #[error("City name {0}")]
    InvalidCity(&'static str),

    #[error("City not found after {attempts} attempt(s)")]
    CityNotFound { attempts: u32 },

    #[error("Geocoding returned no result for '{0}'")]
    NoGeocodingResult(String),

    #[error("Forecast contained {0} entries, at least 3 are required")]
    IncompleteForecast(usize),

    #[error("OpenWeather {0} response has no weather description")]
    MissingDescription(&'static str),

    #[error("Request to OpenWeather failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("OpenWeather request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse OpenWeather {what} JSON: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Filesystem error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WeatherError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
