//! Sequential collection of one reading per catalog city into a single record.

use chrono::Utc;

use crate::{
    catalog::Catalog,
    error::ServiceError,
    model::{CollectionRecord, RequestId, WeatherReading, encode_readings},
    provider::WeatherProvider,
    store::RecordStore,
};

/// Fetch every catalog city in order and append each reading to the record for
/// `request_id`, committing after every city.
///
/// The first failure aborts the run; readings committed before it stay stored.
/// Callers must hold the request id's lock and must have rejected ids that already
/// have a record. Returns the number of readings appended.
pub async fn collect(
    store: &dyn RecordStore,
    provider: &dyn WeatherProvider,
    request_id: &RequestId,
    catalog: &Catalog,
) -> Result<usize, ServiceError> {
    let mut appended = 0;

    for city_id in catalog.iter() {
        let reading = provider.get_weather(city_id).await?;
        append_reading(store, request_id, reading)?;
        appended += 1;

        tracing::debug!(
            request_id = %request_id,
            city_id,
            done = appended,
            total = catalog.len(),
            "stored reading"
        );
    }

    Ok(appended)
}

/// Create-or-update step for a single reading.
fn append_reading(
    store: &dyn RecordStore,
    request_id: &RequestId,
    reading: WeatherReading,
) -> Result<(), ServiceError> {
    match store.get(request_id.as_str())? {
        Some(record) => {
            let mut readings = record.readings()?;
            readings.push(reading);
            store.update_data(request_id.as_str(), &encode_readings(&readings)?)?;
        }
        None => {
            let record = CollectionRecord::first(request_id, Utc::now(), reading)?;
            store.insert(&record)?;
        }
    }
    Ok(())
}
