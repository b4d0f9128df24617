//! Core library for the `weatherdeck` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider behind the [`WeatherProvider`] trait
//! - Normalization of provider JSON into display records
//! - Local time labels computed from provider UTC offsets
//!
//! It is used by `weatherdeck-cli`, but can also back other front ends.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod time;

pub use config::{Config, ProviderSettings};
pub use error::WeatherError;
pub use model::{
    CurrentConditions, ForecastBucket, ForecastSummary, Location, Units, WeatherReport,
    WeatherRequest,
};
pub use provider::{
    WeatherProvider,
    openweather::{OpenWeatherProvider, icon_url},
    provider_from_config,
};
pub use time::format_local_time;
