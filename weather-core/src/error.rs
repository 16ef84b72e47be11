use thiserror::Error;

use crate::model::CityId;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("city catalog must contain at least one city")]
    Empty,

    #[error("city {0} appears more than once in the catalog")]
    Duplicate(CityId),
}

/// Failure talking to the weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to weather provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather provider returned status {status} for city {city_id}: {body}")]
    Status { city_id: CityId, status: u16, body: String },

    #[error("weather provider response for city {city_id} is malformed: {source}")]
    MalformedBody {
        city_id: CityId,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("record '{0}' already exists")]
    Duplicate(String),

    #[error("record '{0}' does not exist")]
    Missing(String),

    #[error("record '{request_id}' has an unreadable timestamp '{value}'")]
    BadTimestamp { request_id: String, value: String },
}

/// Errors surfaced by [`crate::WeatherService`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request ID cannot be blank.")]
    BlankRequestId,

    #[error("request id '{0}' already has a collection record")]
    AlreadyExists(String),

    #[error("request id '{0}' has no collection record")]
    NotFound(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored readings are not valid JSON: {0}")]
    Readings(#[from] serde_json::Error),
}
