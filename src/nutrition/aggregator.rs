use super::model::{saturate, DeclaredTotals, FoodItem, MealRecord, Totals};

/// Totals for one record.
///
/// Each nutrient is resolved on its own: a declared record-level value wins,
/// otherwise the food lines are summed as `nutrient * quantity`.
pub fn aggregate(record: &MealRecord) -> Totals {
    resolve_totals(record.declared(), record.foods())
}

/// Field-wise sum over many records. Nothing is rounded here.
pub fn aggregate_many<'a, I>(records: I) -> Totals
where
    I: IntoIterator<Item = &'a MealRecord>,
{
    records.into_iter().map(aggregate).sum()
}

/// Sum of the food lines alone, ignoring any declared totals.
pub fn sum_foods(foods: &[FoodItem]) -> Totals {
    foods
        .iter()
        .map(|food| {
            let qty = f64::from(food.quantity());
            Totals {
                calories: saturate(food.calories() * qty),
                carbs: saturate(food.carbs() * qty),
                protein: saturate(food.protein() * qty),
                fat: saturate(food.fat() * qty),
            }
        })
        .sum()
}

pub(super) fn resolve_totals(declared: &DeclaredTotals, foods: &[FoodItem]) -> Totals {
    let computed = sum_foods(foods);
    Totals {
        calories: declared.calories.unwrap_or(computed.calories),
        carbs: declared.carbs.unwrap_or(computed.carbs),
        protein: declared.protein.unwrap_or(computed.protein),
        fat: declared.fat.unwrap_or(computed.fat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{normalizer::normalize, raw::RawMealRecord};
    use serde_json::json;

    fn record(value: serde_json::Value) -> MealRecord {
        normalize(&RawMealRecord::new(value)).unwrap()
    }

    #[test]
    fn declared_total_beats_computed() {
        let r = record(json!({
            "date": "2024-06-01",
            "totalKcal": 500,
            "foods": [{ "calories": 100 }, { "calories": 200 }]
        }));
        assert_eq!(aggregate(&r).calories, 500.0);
    }

    #[test]
    fn computed_total_multiplies_quantity() {
        let r = record(json!({
            "date": "2024-06-01",
            "foods": [{ "calories": 100, "quantity": 2 }, { "calories": 50, "quantity": 1 }]
        }));
        assert_eq!(aggregate(&r).calories, 250.0);
    }

    #[test]
    fn priority_is_resolved_per_nutrient() {
        let r = record(json!({
            "date": "2024-06-01",
            "totalKcal": 700,
            "totalProtein": 0,
            "foods": [{ "calories": 300, "carbohydrate": 20, "protein": 15, "fat": 4, "quantity": 2 }]
        }));
        assert_eq!(
            aggregate(&r),
            Totals { calories: 700.0, carbs: 40.0, protein: 30.0, fat: 8.0 }
        );
        assert_eq!(r.totals(), aggregate(&r));
    }

    #[test]
    fn empty_record_is_all_zero() {
        let r = record(json!({ "date": "2024-06-01", "foods": [] }));
        assert_eq!(aggregate(&r), Totals::ZERO);
        assert_eq!(aggregate_many(&[] as &[MealRecord]), Totals::ZERO);
    }

    #[test]
    fn aggregation_is_additive_over_partitions() {
        let records: Vec<MealRecord> = (0..7)
            .map(|i: i32| {
                let carbs = if i % 2 == 0 { 12.5 } else { 0.0 };
                let kcal = 33.3 * f64::from(i);
                record(json!({
                    "id": i,
                    "date": "2024-06-01",
                    "totalCarbs": carbs,
                    "foods": [{ "calories": kcal, "fat": 1.1, "quantity": i + 1 }]
                }))
            })
            .collect();
        let all = aggregate_many(&records);
        for split in 0..=records.len() {
            let (left, right) = records.split_at(split);
            let parts = aggregate_many(left) + aggregate_many(right);
            assert!((all.calories - parts.calories).abs() < 1e-9);
            assert!((all.carbs - parts.carbs).abs() < 1e-9);
            assert!((all.protein - parts.protein).abs() < 1e-9);
            assert!((all.fat - parts.fat).abs() < 1e-9);
        }
    }

    #[test]
    fn end_to_end_breakfast_and_dinner() {
        let breakfast = record(json!({
            "modifiedAt": "2024-06-01T08:00:00",
            "mealType": "아침",
            "foods": [{ "carbohydrate": 40, "protein": 10, "fat": 5, "calories": 255, "quantity": 1 }]
        }));
        let dinner = record(json!({
            "modifiedAt": "2024-06-01T19:00:00",
            "mealType": "DINNER",
            "totalKcal": 600,
            "totalCarbs": 70
        }));
        assert_eq!(breakfast.meal_type().label(), "BREAKFAST");
        assert_eq!(dinner.meal_type().label(), "DINNER");
        assert_eq!(
            aggregate_many([&breakfast, &dinner]),
            Totals { calories: 855.0, carbs: 110.0, protein: 10.0, fat: 5.0 }
        );
    }

    #[test]
    fn overflowing_sums_saturate() {
        let big = record(json!({ "date": "2024-06-01", "totalKcal": 1e308, "totalFat": 2 }));
        let total = aggregate_many([&big, &big, &big]);
        assert_eq!(total.calories, f64::MAX);
        assert_eq!(total.fat, 6.0);
        assert!(sum_foods(big.foods()).calories.is_finite());
    }
}
