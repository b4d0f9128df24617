use crate::{
    Config, WeatherError, WeatherReport, WeatherRequest, provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of dashboard-ready weather data.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherReport, WeatherError>;

    /// URL of the image for a provider icon code.
    fn icon_url(&self, code: &str) -> String;
}

/// Construct the provider described by `config`.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let provider = OpenWeatherProvider::new(config.provider_settings())?;
    Ok(Box::new(provider))
}
