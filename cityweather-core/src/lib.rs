//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration and the API key credential store
//! - City normalization and validation against OpenWeather
//! - The file-per-city cache and its freshness policy
//! - The OpenWeather provider and plain-text table rendering
//!
//! It is used by `cityweather-cli`, but can also be reused by other binaries.

pub mod cache;
pub mod city;
pub mod config;
pub mod credentials;
pub mod error;
pub mod freshness;
pub mod model;
pub mod presenter;
pub mod provider;
pub mod service;

pub use cache::{CacheIndex, CityMatch};
pub use city::{City, CityResolver, Rejection};
pub use config::Config;
pub use credentials::{API_KEY_LEN, ApiKey, CredentialStore};
pub use error::WeatherError;
pub use freshness::FreshnessPolicy;
pub use model::{Coordinates, CurrentWeather, ForecastEntry, WeatherSnapshot};
pub use provider::WeatherProvider;
pub use service::{Lookup, Source, WeatherService};
