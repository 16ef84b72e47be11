use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::ProviderError,
    model::{CityId, WeatherReading},
};

use super::WeatherProvider;

/// Client for OpenWeather's current-weather-by-city-id endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_url: String,
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { api_url, api_key, http })
    }

    async fn fetch_current(&self, city_id: CityId) -> Result<WeatherReading, ProviderError> {
        let id = city_id.to_string();

        let res = self
            .http
            .get(&self.api_url)
            .query(&[
                ("id", id.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                city_id,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|source| ProviderError::MalformedBody { city_id, source })?;

        Ok(WeatherReading {
            city_id,
            temperature: parsed.main.temp,
            humidity: parsed.main.humidity,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: i64,
}

/// Only the fields a reading needs; everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_weather(&self, city_id: CityId) -> Result<WeatherReading, ProviderError> {
        tracing::debug!(city_id, "fetching current weather");
        self.fetch_current(city_id).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
