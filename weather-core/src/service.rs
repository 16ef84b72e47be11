use anyhow::Context;
use std::sync::Arc;

use crate::{
    Config,
    accumulator,
    catalog::Catalog,
    error::ServiceError,
    locks::KeyedLocks,
    model::{ProgressView, RequestId},
    progress,
    provider::{WeatherProvider, provider_from_config},
    store::{RecordStore, SqliteRecordStore},
};

/// Entry point for the two operations the service exposes: starting a
/// collection job and reading its progress.
pub struct WeatherService {
    store: Arc<dyn RecordStore>,
    provider: Arc<dyn WeatherProvider>,
    catalog: Catalog,
    locks: KeyedLocks,
}

impl WeatherService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        provider: Arc<dyn WeatherProvider>,
        catalog: Catalog,
    ) -> Self {
        Self { store, provider, catalog, locks: KeyedLocks::new() }
    }

    /// SQLite store at the configured path, OpenWeather provider, default catalog.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = SqliteRecordStore::open(&config.database_path).with_context(|| {
            format!("Failed to open database: {}", config.database_path.display())
        })?;
        let provider = provider_from_config(config)?;

        Ok(Self::new(Arc::new(store), Arc::from(provider), Catalog::default()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run a full collection job for `request_id`, returning once every city is
    /// stored or the first failure occurs.
    ///
    /// An id that already has a record, or whose job is still running, is
    /// rejected at once with [`ServiceError::AlreadyExists`].
    pub async fn start_collection(&self, request_id: &str) -> Result<usize, ServiceError> {
        let request_id = RequestId::parse(request_id)?;
        self.ensure_absent(&request_id)?;

        let Some(_guard) = self.locks.try_lock(request_id.as_str()) else {
            tracing::warn!(request_id = %request_id, "collection already running");
            return Err(ServiceError::AlreadyExists(request_id.to_string()));
        };
        // A job may have finished between the first check and taking the lock.
        self.ensure_absent(&request_id)?;

        tracing::info!(request_id = %request_id, cities = self.catalog.len(), "starting collection");

        match accumulator::collect(self.store.as_ref(), self.provider.as_ref(), &request_id, &self.catalog)
            .await
        {
            Ok(appended) => {
                tracing::info!(request_id = %request_id, appended, "collection finished");
                Ok(appended)
            }
            Err(err) => {
                tracing::error!(request_id = %request_id, error = %err, "collection aborted");
                Err(err)
            }
        }
    }

    fn ensure_absent(&self, request_id: &RequestId) -> Result<(), ServiceError> {
        if self.store.exists(request_id.as_str())? {
            tracing::warn!(request_id = %request_id, "collection record already exists");
            return Err(ServiceError::AlreadyExists(request_id.to_string()));
        }
        Ok(())
    }

    /// Current progress for `request_id`. Blank ids are rejected before storage is touched.
    pub fn progress(&self, request_id: &str) -> Result<ProgressView, ServiceError> {
        let request_id = RequestId::parse(request_id)?;
        progress::report(self.store.as_ref(), &self.catalog, &request_id)
    }
}
