use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use super::{
    aggregator::aggregate_many,
    model::{MealRecord, MealType, RecordId, Totals},
    period::PeriodResolver,
};

/// Time without food between two consecutive meals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FastingGap {
    pub after: RecordId,
    pub before: RecordId,
    #[serde(with = "time::serde::rfc3339")]
    pub from: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub to: OffsetDateTime,
    /// Whole hours elapsed, rounded down.
    pub hours: i64,
    pub crosses_day: bool,
}

/// One calendar day of meals, ascending by time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub date: Date,
    pub meals: Vec<MealRecord>,
    pub nutrition_totals: Totals,
    pub fasting_gaps: Vec<FastingGap>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MealTypeCounts {
    pub breakfast: usize,
    pub lunch: usize,
    pub dinner: usize,
    pub snack: usize,
    pub unknown: usize,
}

impl MealTypeCounts {
    pub fn add(&mut self, meal_type: &MealType) {
        match meal_type {
            MealType::Breakfast => self.breakfast += 1,
            MealType::Lunch => self.lunch += 1,
            MealType::Dinner => self.dinner += 1,
            MealType::Snack => self.snack += 1,
            MealType::Unknown(_) => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.breakfast + self.lunch + self.dinner + self.snack + self.unknown
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightPoint {
    pub date: Date,
    pub weight_kg: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// Everything the monthly record view needs for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    /// 0-based, January is 0.
    pub month: u8,
    pub record_count: usize,
    pub meal_counts: MealTypeCounts,
    pub nutrition_totals: Totals,
    pub days: Vec<DayGroup>,
    pub weights: Vec<WeightPoint>,
}

impl MonthlyReport {
    pub fn build<'a, I>(records: I, year: i32, month0: u8, offset: UtcOffset) -> Self
    where
        I: IntoIterator<Item = &'a MealRecord>,
    {
        let hits = PeriodResolver::new(offset).query_month(records, year, month0);
        Self {
            year,
            month: month0,
            record_count: hits.len(),
            meal_counts: meal_type_counts(hits.iter().copied()),
            nutrition_totals: aggregate_many(hits.iter().copied()).rounded(),
            days: group_by_day(hits.iter().copied(), offset),
            weights: weight_series(hits, offset),
        }
    }
}

fn sorted<'a, I>(records: I) -> Vec<&'a MealRecord>
where
    I: IntoIterator<Item = &'a MealRecord>,
{
    let mut out: Vec<&MealRecord> = records.into_iter().collect();
    out.sort_by_key(|r| r.timestamp());
    out
}

/// Gaps between each pair of consecutive meals in timestamp order.
pub fn fasting_gaps<'a, I>(records: I, offset: UtcOffset) -> Vec<FastingGap>
where
    I: IntoIterator<Item = &'a MealRecord>,
{
    sorted(records)
        .windows(2)
        .map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            let from = a.timestamp();
            let to = b.timestamp();
            FastingGap {
                after: a.id().clone(),
                before: b.id().clone(),
                from,
                to,
                hours: (to - from).whole_hours(),
                crosses_day: from.to_offset(offset).date() != to.to_offset(offset).date(),
            }
        })
        .collect()
}

/// Records grouped by their calendar day in `offset`, days ascending.
pub fn group_by_day<'a, I>(records: I, offset: UtcOffset) -> Vec<DayGroup>
where
    I: IntoIterator<Item = &'a MealRecord>,
{
    let mut by_day: BTreeMap<Date, Vec<&MealRecord>> = BTreeMap::new();
    for record in sorted(records) {
        by_day
            .entry(record.timestamp().to_offset(offset).date())
            .or_default()
            .push(record);
    }
    by_day
        .into_iter()
        .map(|(date, meals)| DayGroup {
            date,
            nutrition_totals: aggregate_many(meals.iter().copied()).rounded(),
            fasting_gaps: fasting_gaps(meals.iter().copied(), offset),
            meals: meals.into_iter().cloned().collect(),
        })
        .collect()
}

pub fn meal_type_counts<'a, I>(records: I) -> MealTypeCounts
where
    I: IntoIterator<Item = &'a MealRecord>,
{
    records
        .into_iter()
        .fold(MealTypeCounts::default(), |mut counts, r| {
            counts.add(r.meal_type());
            counts
        })
}

/// Last weight recorded on each day that has one.
pub fn weight_series<'a, I>(records: I, offset: UtcOffset) -> Vec<WeightPoint>
where
    I: IntoIterator<Item = &'a MealRecord>,
{
    let mut by_day: BTreeMap<Date, WeightPoint> = BTreeMap::new();
    for record in sorted(records) {
        let Some(weight_kg) = record.record_weight() else {
            continue;
        };
        let recorded_at = record.timestamp();
        let date = recorded_at.to_offset(offset).date();
        by_day.insert(
            date,
            WeightPoint {
                date,
                weight_kg,
                recorded_at,
            },
        );
    }
    by_day.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{normalizer::normalize, raw::RawMealRecord};
    use serde_json::json;
    use time::macros::{date, offset};

    fn meal(value: serde_json::Value) -> MealRecord {
        normalize(&RawMealRecord::new(value)).unwrap()
    }

    #[test]
    fn fasting_gaps_floor_to_whole_hours() {
        let records = vec![
            meal(json!({ "id": 2, "modifiedAt": "2024-06-01T12:59:00Z" })),
            meal(json!({ "id": 1, "modifiedAt": "2024-06-01T08:00:00Z" })),
            meal(json!({ "id": 3, "modifiedAt": "2024-06-02T07:30:00Z" })),
        ];
        let gaps = fasting_gaps(&records, UtcOffset::UTC);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].after, RecordId::Number(1));
        assert_eq!(gaps[0].before, RecordId::Number(2));
        assert_eq!(gaps[0].hours, 4);
        assert!(!gaps[0].crosses_day);
        assert_eq!(gaps[1].hours, 18);
        assert!(gaps[1].crosses_day);
    }

    #[test]
    fn fewer_than_two_meals_have_no_gaps() {
        let records = vec![meal(json!({ "modifiedAt": "2024-06-01T08:00:00Z" }))];
        assert!(fasting_gaps(&records, UtcOffset::UTC).is_empty());
        assert!(fasting_gaps(&[] as &[MealRecord], UtcOffset::UTC).is_empty());
    }

    #[test]
    fn groups_days_with_totals_and_gaps() {
        let records = vec![
            meal(json!({ "id": 3, "modifiedAt": "2024-06-02T09:00:00Z", "totalKcal": 400 })),
            meal(json!({ "id": 2, "modifiedAt": "2024-06-01T19:00:00Z", "totalKcal": 600.25 })),
            meal(json!({ "id": 1, "modifiedAt": "2024-06-01T08:00:00Z", "totalKcal": 255 })),
        ];
        let days = group_by_day(&records, UtcOffset::UTC);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date!(2024-06-01));
        assert_eq!(days[0].meals[0].id(), &RecordId::Number(1));
        assert_eq!(days[0].nutrition_totals.calories, 855.3);
        assert_eq!(days[0].fasting_gaps.len(), 1);
        assert_eq!(days[0].fasting_gaps[0].hours, 11);
        assert_eq!(days[1].date, date!(2024-06-02));
        assert!(days[1].fasting_gaps.is_empty());
    }

    #[test]
    fn day_boundaries_follow_offset() {
        let records = vec![
            meal(json!({ "modifiedAt": "2024-06-01T14:00:00Z" })),
            meal(json!({ "modifiedAt": "2024-06-01T16:00:00Z" })),
        ];
        assert_eq!(group_by_day(&records, UtcOffset::UTC).len(), 1);
        let seoul = group_by_day(&records, offset!(+9));
        assert_eq!(seoul.len(), 2);
        assert_eq!(seoul[1].date, date!(2024-06-02));
    }

    #[test]
    fn counts_meal_types() {
        let records = vec![
            meal(json!({ "date": "2024-06-01", "mealType": "아침" })),
            meal(json!({ "date": "2024-06-01", "mealType": "BREAKFAST" })),
            meal(json!({ "date": "2024-06-01", "mealType": "간식" })),
            meal(json!({ "date": "2024-06-01", "mealType": "late" })),
        ];
        let counts = meal_type_counts(&records);
        assert_eq!(
            counts,
            MealTypeCounts { breakfast: 2, lunch: 0, dinner: 0, snack: 1, unknown: 1 }
        );
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn weight_series_keeps_last_weight_per_day() {
        let records = vec![
            meal(json!({ "modifiedAt": "2024-06-01T19:00:00Z", "recordWeight": 70.2 })),
            meal(json!({ "modifiedAt": "2024-06-01T08:00:00Z", "recordWeight": 70.8 })),
            meal(json!({ "modifiedAt": "2024-06-02T08:00:00Z" })),
            meal(json!({ "modifiedAt": "2024-06-03T08:00:00Z", "recordWeight": 69.9 })),
        ];
        let series = weight_series(&records, UtcOffset::UTC);
        let points: Vec<_> = series.iter().map(|p| (p.date, p.weight_kg)).collect();
        assert_eq!(points, vec![(date!(2024-06-01), 70.2), (date!(2024-06-03), 69.9)]);
    }

    #[test]
    fn monthly_report_bundles_the_month() {
        let records = vec![
            meal(json!({ "modifiedAt": "2024-05-31T20:00:00Z", "mealType": "DINNER", "totalKcal": 900 })),
            meal(json!({ "modifiedAt": "2024-06-01T08:00:00Z", "mealType": "아침", "totalKcal": 255, "recordWeight": 70 })),
            meal(json!({ "modifiedAt": "2024-06-15T12:00:00Z", "mealType": "LUNCH", "totalKcal": 700 })),
        ];
        let report = MonthlyReport::build(&records, 2024, 5, UtcOffset::UTC);
        assert_eq!(report.month, 5);
        assert_eq!(report.record_count, 2);
        assert_eq!(report.meal_counts.breakfast, 1);
        assert_eq!(report.meal_counts.lunch, 1);
        assert_eq!(report.meal_counts.dinner, 0);
        assert_eq!(report.nutrition_totals.calories, 955.0);
        assert_eq!(report.days.len(), 2);
        assert_eq!(report.weights.len(), 1);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["days"][0]["date"], json!("2024-06-01"));
    }
}
