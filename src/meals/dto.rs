use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::nutrition::{
    DayGroup, FastingGap, MealRecord, MonthlyReport, NormalizationFailure, RawMealRecord, Totals,
};

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    #[serde(default)]
    pub records: Vec<RawMealRecord>,
}

#[derive(Debug, Deserialize)]
pub struct DailyRequest {
    #[serde(default)]
    pub records: Vec<RawMealRecord>,
    pub date: Date,
}

/// `start`/`end` are RFC 3339 instants, local date-times, or plain dates.
#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    #[serde(default)]
    pub records: Vec<RawMealRecord>,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyRequest {
    #[serde(default)]
    pub records: Vec<RawMealRecord>,
    pub year: i32,
    /// 0-based, January is 0.
    pub month: u8,
}

#[derive(Debug, Deserialize)]
pub struct TimelineRequest {
    #[serde(default)]
    pub records: Vec<RawMealRecord>,
    pub dates: Vec<Date>,
}

/// A raw record that could not be loaded.
#[derive(Debug, Serialize)]
pub struct FailedRecord {
    pub index: usize,
    pub error: String,
    pub raw: RawMealRecord,
}

impl From<NormalizationFailure> for FailedRecord {
    fn from(f: NormalizationFailure) -> Self {
        Self {
            index: f.index,
            error: f.error.to_string(),
            raw: f.raw,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub records: Vec<MealRecord>,
    pub failures: Vec<FailedRecord>,
}

#[derive(Debug, Serialize)]
pub struct DailyResponse {
    pub date: Date,
    pub meal_records: Vec<MealRecord>,
    pub nutrition_totals: Totals,
    pub fasting_gaps: Vec<FastingGap>,
    pub failures: Vec<FailedRecord>,
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
    pub data: Vec<MealRecord>,
    pub nutrition_totals: Totals,
    pub failures: Vec<FailedRecord>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyResponse {
    #[serde(flatten)]
    pub report: MonthlyReport,
    pub failures: Vec<FailedRecord>,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub days: Vec<DayGroup>,
    pub failures: Vec<FailedRecord>,
}
