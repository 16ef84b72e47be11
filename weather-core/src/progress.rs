use crate::{
    catalog::Catalog,
    error::ServiceError,
    model::{ProgressView, RequestId, decode_readings},
    store::RecordStore,
};

/// Whole percent of `total` covered by `collected`, rounded down.
///
/// Not clamped: more readings than catalog entries yields more than 100.
pub fn percent_complete(collected: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    collected * 100 / total
}

pub fn progress_label(percent: usize) -> String {
    format!("{percent}% uploaded...")
}

/// Read-only view of how far the job for `request_id` has come.
pub fn report(
    store: &dyn RecordStore,
    catalog: &Catalog,
    request_id: &RequestId,
) -> Result<ProgressView, ServiceError> {
    let record = store
        .get(request_id.as_str())?
        .ok_or_else(|| ServiceError::NotFound(request_id.to_string()))?;

    let collected = decode_readings(&record.data)?.len();
    let percent = percent_complete(collected, catalog.len());

    Ok(ProgressView {
        request_id: record.request_id,
        timestamp: record.timestamp,
        data: record.data,
        upload_progress: progress_label(percent),
    })
}
