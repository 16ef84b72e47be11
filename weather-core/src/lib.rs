//! Core library for the weather collection service.
//!
//! This crate defines:
//! - The fixed city catalog every collection job walks through
//! - The OpenWeather client behind the `WeatherProvider` trait
//! - The record store (SQLite) keyed by request id
//! - The sequential accumulator and progress reporting
//! - Configuration loading
//!
//! It is used by `weather-server`, but can also be reused by other binaries.

pub mod accumulator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod locks;
pub mod model;
pub mod progress;
pub mod provider;
pub mod service;
pub mod store;

pub use catalog::{CITY_IDS, Catalog};
pub use config::{Config, ProviderConfig};
pub use error::{CatalogError, ProviderError, ServiceError, StoreError};
pub use model::{CityId, CollectionRecord, ProgressView, RequestId, WeatherReading};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use service::WeatherService;
pub use store::{RecordStore, SqliteRecordStore};
