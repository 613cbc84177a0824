//! City names and interactive validation against the provider.

use crate::{
    error::{Result, WeatherError},
    provider::WeatherProvider,
};

/// A normalized (trimmed, uppercased) city name. Used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct City(String);

impl City {
    /// The name becomes part of a cache filename, so path syntax is refused.
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            return Err(WeatherError::InvalidCity("must not be empty"));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(WeatherError::InvalidCity("must not contain path separators"));
        }
        if name.contains("..") {
            return Err(WeatherError::InvalidCity("must not contain '..'"));
        }
        Ok(Self(name.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for City {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

/// Why the previous answer was turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Invalid(&'static str),
    NotFound(City),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Invalid(reason) => write!(f, "City name {reason}."),
            Rejection::NotFound(city) => write!(f, "City '{city}' was not found."),
        }
    }
}

/// Asks for city names until the provider recognizes one, up to `max_attempts` times.
///
/// Transport and API failures abort immediately; only "not found" answers
/// and invalid names consume attempts.
#[derive(Debug)]
pub struct CityResolver<'a> {
    provider: &'a dyn WeatherProvider,
    max_attempts: u32,
}

impl<'a> CityResolver<'a> {
    pub fn new(provider: &'a dyn WeatherProvider, max_attempts: u32) -> Self {
        Self {
            provider,
            max_attempts: max_attempts.max(1),
        }
    }

    /// `prompt` receives the rejection of the previous answer, if any, and
    /// returns the next raw city name.
    pub async fn resolve<F>(&self, mut prompt: F) -> anyhow::Result<City>
    where
        F: FnMut(Option<&Rejection>) -> anyhow::Result<String>,
    {
        let mut rejection = None;

        for attempt in 1..=self.max_attempts {
            let raw = prompt(rejection.as_ref())?;

            let city = match City::new(&raw) {
                Ok(city) => city,
                Err(WeatherError::InvalidCity(reason)) => {
                    tracing::debug!(attempt, reason, "invalid city name");
                    rejection = Some(Rejection::Invalid(reason));
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if self.provider.city_exists(&city).await? {
                tracing::debug!(%city, attempt, "city accepted");
                return Ok(city);
            }

            tracing::info!(%city, attempt, "city not found");
            rejection = Some(Rejection::NotFound(city));
        }

        Err(WeatherError::CityNotFound {
            attempts: self.max_attempts,
        }
        .into())
    }
}
