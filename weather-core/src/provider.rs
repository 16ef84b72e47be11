use crate::{Config, error::ProviderError, model::{CityId, WeatherReading}};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current weather readings, one city per call.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, city_id: CityId) -> Result<WeatherReading, ProviderError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::new(
        config.provider.api_url.clone(),
        api_key.to_owned(),
        config.provider.timeout(),
    )?;

    Ok(Box::new(provider))
}
