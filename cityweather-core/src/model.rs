use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError};

/// Latitude/longitude pair as returned by the geocoding endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub description: String,
}

/// One 3-hour forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub temperature_c: f64,
    pub description: String,
    pub time: NaiveDateTime,
}

/// Everything the presenter needs to render a table: "now" plus three forecast steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentWeather,
    pub forecast: [ForecastEntry; 3],
}

impl WeatherSnapshot {
    pub fn new(current: CurrentWeather, forecast: [ForecastEntry; 3]) -> Self {
        Self { current, forecast }
    }
}

/// Keeps the leading three entries of a forecast list.
pub fn first_three(entries: Vec<ForecastEntry>) -> Result<[ForecastEntry; 3]> {
    let available = entries.len();
    entries
        .into_iter()
        .take(3)
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| WeatherError::IncompleteForecast(available))
}
