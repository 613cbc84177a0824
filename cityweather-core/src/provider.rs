use crate::{
    City,
    config::ApiConfig,
    credentials::ApiKey,
    error::Result,
    model::{Coordinates, CurrentWeather, ForecastEntry},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The four lookups the tool needs from a weather service.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Whether the service recognizes `city` by name.
    async fn city_exists(&self, city: &City) -> Result<bool>;

    /// First geocoding match for `city`.
    async fn coordinates(&self, city: &City) -> Result<Coordinates>;

    async fn current(&self, coords: Coordinates) -> Result<CurrentWeather>;

    /// The next three 3-hour forecast steps.
    async fn forecast(&self, coords: Coordinates) -> Result<[ForecastEntry; 3]>;
}

/// Construct the OpenWeather provider from the `[api]` config section and a loaded key.
pub fn provider_from_config(
    config: &ApiConfig,
    api_key: ApiKey,
) -> Result<Box<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::builder(api_key)
        .base_url(&config.base_url)
        .timeout_secs(config.timeout_secs)
        .build()?;

    Ok(Box::new(provider))
}
