use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// OpenWeather city identifier.
pub type CityId = u32;

/// Client-supplied identifier of one collection job. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Accepts any string that is not empty or whitespace-only. The value is kept as given.
    pub fn parse(value: impl Into<String>) -> Result<Self, ServiceError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ServiceError::BlankRequestId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One city's weather snapshot at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city_id: CityId,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent, passed through from the provider without range checks.
    pub humidity: i64,
}

/// Persisted row: readings accumulated for one request id.
///
/// `data` is the serialized JSON array of [`WeatherReading`]s, exactly as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRecord {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub data: String,
}

impl CollectionRecord {
    /// Start a record holding a single reading.
    pub fn first(
        request_id: &RequestId,
        timestamp: DateTime<Utc>,
        reading: WeatherReading,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            request_id: request_id.as_str().to_string(),
            timestamp,
            data: encode_readings(&[reading])?,
        })
    }

    pub fn readings(&self) -> serde_json::Result<Vec<WeatherReading>> {
        decode_readings(&self.data)
    }
}

pub fn encode_readings(readings: &[WeatherReading]) -> serde_json::Result<String> {
    serde_json::to_string(readings)
}

/// An empty blob decodes to no readings.
pub fn decode_readings(data: &str) -> serde_json::Result<Vec<WeatherReading>> {
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(data)
}

/// What a poller sees for a request id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    /// Raw serialized readings blob.
    pub data: String,
    pub upload_progress: String,
}
