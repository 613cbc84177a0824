use std::{path::PathBuf, time::SystemTime};

use anyhow::{Context, Result};

use crate::{
    City, Config,
    cache::CacheIndex,
    credentials::ApiKey,
    freshness::FreshnessPolicy,
    model::WeatherSnapshot,
    presenter,
    provider::{WeatherProvider, provider_from_config},
};

/// Where the text of a [`Lookup`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Fetched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub city: City,
    pub text: String,
    /// Cache file the text was read from.
    pub path: PathBuf,
    pub source: Source,
}

/// Cache-first weather lookups for a single city at a time.
#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
    index: CacheIndex,
    policy: FreshnessPolicy,
}

impl WeatherService {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        index: CacheIndex,
        policy: FreshnessPolicy,
    ) -> Self {
        Self {
            provider,
            index,
            policy,
        }
    }

    /// Wire the OpenWeather provider and the on-disk cache from `config`.
    pub fn from_config(config: &Config, api_key: ApiKey) -> Result<Self> {
        let provider = provider_from_config(&config.api, api_key)
            .context("Failed to build OpenWeather client")?;
        let index = CacheIndex::new(config.cache_dir()?, config.cache.city_match);
        let policy = FreshnessPolicy::new(config.cache.freshness_window());

        Ok(Self::new(provider, index, policy))
    }

    pub fn provider(&self) -> &dyn WeatherProvider {
        self.provider.as_ref()
    }

    pub fn index(&self) -> &CacheIndex {
        &self.index
    }

    /// Return the cached table for `city` when fresh, otherwise fetch, render,
    /// write it to the cache and return what was written.
    pub async fn lookup(&self, city: &City, force_refresh: bool) -> Result<Lookup> {
        if !force_refresh {
            let now = SystemTime::now();
            if let Some(entry) = self.index.find(city)? {
                if !self.policy.is_stale(entry.modified, now) {
                    tracing::info!(%city, "using cached weather");
                    return Ok(Lookup {
                        city: city.clone(),
                        text: self.index.read_at(&entry.path)?,
                        path: entry.path,
                        source: Source::Cache,
                    });
                }
            }
        }

        let path = self.refresh(city).await?;

        Ok(Lookup {
            city: city.clone(),
            text: self.index.read_at(&path)?,
            path,
            source: Source::Fetched,
        })
    }

    /// Fetch, render and store the table for `city`; returns the cache file written.
    async fn refresh(&self, city: &City) -> Result<PathBuf> {
        tracing::info!(%city, "fetching weather");

        let coords = self
            .provider
            .coordinates(city)
            .await
            .with_context(|| format!("Failed to resolve coordinates for {city}"))?;
        let current = self
            .provider
            .current(coords)
            .await
            .with_context(|| format!("Failed to fetch current weather for {city}"))?;
        let forecast = self
            .provider
            .forecast(coords)
            .await
            .with_context(|| format!("Failed to fetch forecast for {city}"))?;

        let text = presenter::render(city, &WeatherSnapshot::new(current, forecast));
        Ok(self.index.write(city, coords, &text)?)
    }
}
