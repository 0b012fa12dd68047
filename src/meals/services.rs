use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use tracing::{debug, warn};

use super::dto::FailedRecord;
use crate::error::ApiError;
use crate::nutrition::{timestamp, NormalizedBatch, RawMealRecord};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// Normalizes a request's records, enforcing the configured batch limit.
pub fn normalize_payload(
    state: &AppState,
    records: &[RawMealRecord],
) -> Result<NormalizedBatch, ApiError> {
    let limit = state.config.max_records;
    if records.len() > limit {
        warn!(count = records.len(), limit, "too many records in request");
        return Err(ApiError::BadRequest(format!(
            "at most {limit} records per request, got {}",
            records.len()
        )));
    }
    let batch = state.normalizer().normalize_batch(records);
    debug!(
        normalized = batch.records.len(),
        failed = batch.failures.len(),
        "records normalized"
    );
    Ok(batch)
}

pub fn into_failed(batch: &mut NormalizedBatch) -> Vec<FailedRecord> {
    std::mem::take(&mut batch.failures)
        .into_iter()
        .map(FailedRecord::from)
        .collect()
}

/// A plain date is widened to the first or last instant of that day.
pub fn resolve_bound(text: &str, offset: UtcOffset, edge: Edge) -> Result<OffsetDateTime, ApiError> {
    if let Some(date) = timestamp::parse_date(text) {
        return Ok(day_edge(date, offset, edge));
    }
    timestamp::parse_text(text, offset)
        .ok_or_else(|| ApiError::BadRequest(format!("unrecognized date or instant {text:?}")))
}

fn day_edge(date: Date, offset: UtcOffset, edge: Edge) -> OffsetDateTime {
    let time = match edge {
        Edge::Start => Time::MIDNIGHT,
        Edge::End => Time::MAX,
    };
    PrimitiveDateTime::new(date, time).assume_offset(offset)
}
