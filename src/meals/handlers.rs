use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use super::dto::{
    DailyRequest, DailyResponse, MonthlyRequest, MonthlyResponse, NormalizeRequest,
    NormalizeResponse, RangeRequest, RangeResponse, TimelineRequest, TimelineResponse,
};
use super::services::{into_failed, normalize_payload, resolve_bound, Edge};
use crate::{
    error::ApiError,
    nutrition::{aggregate_many, report, DateRange, MonthlyReport},
    state::AppState,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/normalize", post(normalize_meals))
        .route("/meals/daily", post(daily_meals))
        .route("/meals/range", post(range_meals))
        .route("/meals/monthly", post(monthly_meals))
        .route("/meals/timeline", post(meal_timeline))
}

#[instrument(skip(state, body), fields(count = body.records.len()))]
pub async fn normalize_meals(
    State(state): State<AppState>,
    Json(body): Json<NormalizeRequest>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let mut batch = normalize_payload(&state, &body.records)?;
    let failures = into_failed(&mut batch);
    info!(normalized = batch.records.len(), failed = failures.len(), "normalize");
    Ok(Json(NormalizeResponse {
        records: batch.records,
        failures,
    }))
}

#[instrument(skip(state, body), fields(date = %body.date))]
pub async fn daily_meals(
    State(state): State<AppState>,
    Json(body): Json<DailyRequest>,
) -> Result<Json<DailyResponse>, ApiError> {
    let mut batch = normalize_payload(&state, &body.records)?;
    let failures = into_failed(&mut batch);
    let resolver = state.resolver();
    let hits = resolver.query_day(&batch.records, body.date);

    info!(matched = hits.len(), failed = failures.len(), "daily meals");
    Ok(Json(DailyResponse {
        date: body.date,
        nutrition_totals: aggregate_many(hits.iter().copied()).rounded(),
        fasting_gaps: report::fasting_gaps(hits.iter().copied(), resolver.offset()),
        meal_records: hits.into_iter().cloned().collect(),
        failures,
    }))
}

#[instrument(skip(state, body), fields(start = %body.start, end = %body.end))]
pub async fn range_meals(
    State(state): State<AppState>,
    Json(body): Json<RangeRequest>,
) -> Result<Json<RangeResponse>, ApiError> {
    let offset = state.config.utc_offset;
    let range = DateRange::new(
        resolve_bound(&body.start, offset, Edge::Start)?,
        resolve_bound(&body.end, offset, Edge::End)?,
    );
    let mut batch = normalize_payload(&state, &body.records)?;
    let failures = into_failed(&mut batch);
    let hits = state.resolver().query(&batch.records, range);

    info!(matched = hits.len(), failed = failures.len(), "range meals");
    Ok(Json(RangeResponse {
        start: range.start,
        end: range.end,
        nutrition_totals: aggregate_many(hits.iter().copied()).rounded(),
        data: hits.into_iter().cloned().collect(),
        failures,
    }))
}

#[instrument(skip(state, body), fields(year = body.year, month = body.month))]
pub async fn monthly_meals(
    State(state): State<AppState>,
    Json(body): Json<MonthlyRequest>,
) -> Result<Json<MonthlyResponse>, ApiError> {
    if body.month > 11 {
        return Err(ApiError::BadRequest(format!(
            "month is 0-based and must be 0..=11, got {}",
            body.month
        )));
    }
    let mut batch = normalize_payload(&state, &body.records)?;
    let failures = into_failed(&mut batch);
    let report =
        MonthlyReport::build(&batch.records, body.year, body.month, state.config.utc_offset);

    info!(matched = report.record_count, failed = failures.len(), "monthly meals");
    Ok(Json(MonthlyResponse { report, failures }))
}

#[instrument(skip(state, body), fields(days = body.dates.len()))]
pub async fn meal_timeline(
    State(state): State<AppState>,
    Json(body): Json<TimelineRequest>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let mut batch = normalize_payload(&state, &body.records)?;
    let failures = into_failed(&mut batch);
    let resolver = state.resolver();
    let hits = resolver.query_dates(&batch.records, &body.dates);
    let days = report::group_by_day(hits, resolver.offset());

    info!(days = days.len(), failed = failures.len(), "meal timeline");
    Ok(Json(TimelineResponse { days, failures }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn raw(records: serde_json::Value) -> Vec<crate::nutrition::RawMealRecord> {
        serde_json::from_value(records).unwrap()
    }

    #[tokio::test]
    async fn daily_collects_failures_without_failing() {
        let body = DailyRequest {
            records: raw(json!([
                { "id": 1, "modifiedAt": "2024-06-01T08:00:00", "totalKcal": 300 },
                { "id": 2 },
                { "id": 3, "modifiedAt": "2024-06-02T08:00:00", "totalKcal": 999 }
            ])),
            date: date!(2024-06-01),
        };
        let Json(resp) = daily_meals(State(AppState::fake()), Json(body)).await.unwrap();
        assert_eq!(resp.meal_records.len(), 1);
        assert_eq!(resp.nutrition_totals.calories, 300.0);
        assert_eq!(resp.failures.len(), 1);
        assert_eq!(resp.failures[0].index, 1);
    }

    #[tokio::test]
    async fn monthly_rejects_out_of_range_month() {
        let body = MonthlyRequest {
            records: Vec::new(),
            year: 2024,
            month: 12,
        };
        let err = monthly_meals(State(AppState::fake()), Json(body)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn range_with_plain_dates_covers_whole_days() {
        let body = RangeRequest {
            records: raw(json!([
                { "id": 1, "modifiedAt": "2024-06-01T00:00:00" },
                { "id": 2, "modifiedAt": "2024-06-03T23:59:59" },
                { "id": 3, "modifiedAt": "2024-06-04T00:00:00" }
            ])),
            start: "2024-06-01".into(),
            end: "2024-06-03".into(),
        };
        let Json(resp) = range_meals(State(AppState::fake()), Json(body)).await.unwrap();
        assert_eq!(resp.data.len(), 2);
    }
}
