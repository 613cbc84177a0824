use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use crate::{
    City,
    credentials::ApiKey,
    error::{Result, WeatherError},
    model::{self, Coordinates, CurrentWeather, ForecastEntry},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const GEOCODING_PATH: &str = "/geo/1.0/direct";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

/// Entries requested from the forecast endpoint; only the first three are kept.
const FORECAST_COUNT: &str = "5";

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: ApiKey,
    base_url: String,
    http: Client,
}

#[derive(Debug)]
pub struct OpenWeatherBuilder {
    api_key: ApiKey,
    base_url: String,
    timeout: Option<Duration>,
}

impl OpenWeatherBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// `0` disables the request timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn build(self) -> Result<OpenWeatherProvider> {
        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(OpenWeatherProvider {
            api_key: self.api_key,
            base_url: self.base_url,
            http: http.build()?,
        })
    }
}

impl OpenWeatherProvider {
    pub fn builder(api_key: ApiKey) -> OpenWeatherBuilder {
        OpenWeatherBuilder {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Send a GET and return the status together with the raw body.
    async fn get(
        &self,
        path: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<(StatusCode, String)> {
        let url = format!("{}{}", self.base_url, path);
        query.push(("appid", self.api_key.as_str().to_string()));

        tracing::debug!(%url, "OpenWeather request");

        let res = self.http.get(&url).query(&query).send().await?;
        let status = res.status();
        let body = res.text().await?;

        tracing::debug!(%url, %status, bytes = body.len(), "OpenWeather response");
        Ok((status, body))
    }

    /// GET that requires a success status and decodes the body as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &'static str,
        path: &str,
        query: Vec<(&str, String)>,
    ) -> Result<T> {
        let (status, body) = self.get(path, query).await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Decode { what, source })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn city_exists(&self, city: &City) -> Result<bool> {
        let query = vec![("q", city.to_string()), ("units", "metric".to_string())];
        let (status, body) = self.get(CURRENT_PATH, query).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        // The API has been seen to answer 200 with `"cod": "404"` in the body.
        let parsed: OwStatus =
            serde_json::from_str(&body).map_err(|source| WeatherError::Decode {
                what: "current weather",
                source,
            })?;

        Ok(!parsed.cod.as_ref().is_some_and(|cod| cod.is_not_found()))
    }

    async fn coordinates(&self, city: &City) -> Result<Coordinates> {
        let query = vec![("q", city.to_string()), ("limit", "1".to_string())];
        let places: Vec<OwPlace> = self.get_json("geocoding", GEOCODING_PATH, query).await?;

        let place = places
            .first()
            .ok_or_else(|| WeatherError::NoGeocodingResult(city.to_string()))?;

        Ok(Coordinates::new(place.lat, place.lon))
    }

    async fn current(&self, coords: Coordinates) -> Result<CurrentWeather> {
        let parsed: OwCurrentResponse =
            self.get_json("current weather", CURRENT_PATH, coords_query(coords)).await?;

        Ok(CurrentWeather {
            temperature_c: parsed.main.temp,
            description: describe("current weather", &parsed.weather)?,
        })
    }

    async fn forecast(&self, coords: Coordinates) -> Result<[ForecastEntry; 3]> {
        let mut query = coords_query(coords);
        query.push(("cnt", FORECAST_COUNT.to_string()));

        let parsed: OwForecastResponse = self.get_json("forecast", FORECAST_PATH, query).await?;

        let entries = parsed
            .list
            .into_iter()
            .map(|entry| {
                Ok(ForecastEntry {
                    temperature_c: entry.main.temp,
                    description: describe("forecast", &entry.weather)?,
                    time: entry.dt_txt,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        model::first_three(entries)
    }
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(deserialize_with = "deserialize_dt_txt")]
    dt_txt: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

/// `cod` is a number on success and usually a string on errors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCod {
    Number(u16),
    Text(String),
}

impl OwCod {
    fn is_not_found(&self) -> bool {
        match self {
            OwCod::Number(code) => *code == 404,
            OwCod::Text(code) => code.trim() == "404",
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwStatus {
    cod: Option<OwCod>,
}

fn deserialize_dt_txt<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, DT_TXT_FORMAT).map_err(serde::de::Error::custom)
}

fn coords_query(coords: Coordinates) -> Vec<(&'static str, String)> {
    vec![
        ("lat", coords.lat.to_string()),
        ("lon", coords.lon.to_string()),
        ("units", "metric".to_string()),
    ]
}

/// `weather[0].description`; an empty `weather` array is malformed.
fn describe(what: &'static str, weather: &[OwWeather]) -> Result<String> {
    weather
        .first()
        .map(|w| w.description.clone())
        .ok_or(WeatherError::MissingDescription(what))
}

fn api_error(status: StatusCode, body: &str) -> WeatherError {
    WeatherError::Api {
        status: status.as_u16(),
        body: truncate_body(body),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
