use std::borrow::Cow;

use serde_json::Value;
use time::UtcOffset;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    aggregator,
    error::NormalizationError,
    model::{DeclaredTotals, FoodCategory, FoodItem, MealRecord, MealType, RecordId},
    raw::*,
    timestamp,
};

/// Turns raw upstream payloads into canonical [`MealRecord`]s.
///
/// `offset` is applied to date values that carry no offset of their own.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    offset: UtcOffset,
}

/// Outcome of normalizing many records at once.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Successfully normalized records, in input order.
    pub records: Vec<MealRecord>,
    pub failures: Vec<NormalizationFailure>,
}

#[derive(Debug, Clone)]
pub struct NormalizationFailure {
    /// Position of the record in the input batch.
    pub index: usize,
    pub error: NormalizationError,
    pub raw: RawMealRecord,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(UtcOffset::UTC)
    }
}

impl Normalizer {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub fn normalize(&self, raw: &RawMealRecord) -> Result<MealRecord, NormalizationError> {
        let timestamp = raw
            .candidates(DATE_KEYS)
            .find_map(|v| timestamp::parse_instant(v, self.offset))
            .ok_or(NormalizationError::MissingOrInvalidDate)?;

        let foods: Vec<FoodItem> = raw.foods().map(normalize_food).collect();
        let skipped = raw.food_entry_count() - foods.len();
        if skipped > 0 {
            debug!(skipped, "ignored non-object food entries");
        }

        let declared = DeclaredTotals::new(
            raw.first_positive(TOTAL_KCAL_KEYS),
            raw.first_positive(TOTAL_CARBS_KEYS),
            raw.first_positive(TOTAL_PROTEIN_KEYS),
            raw.first_positive(TOTAL_FAT_KEYS),
        );
        let totals = aggregator::resolve_totals(&declared, &foods);

        let id = raw
            .candidates(ID_KEYS)
            .find_map(RecordId::from_value)
            .unwrap_or_else(|| derived_id(raw));

        Ok(MealRecord {
            id,
            timestamp,
            meal_type: MealType::from_raw(meal_type_label(raw).as_deref()),
            foods,
            declared,
            totals,
            record_weight: raw.first_positive(WEIGHT_KEYS),
            memo: raw.first_text(MEMO_KEYS).map(str::to_owned),
            image_url: raw.first_text(IMAGE_KEYS).map(str::to_owned),
        })
    }

    /// Normalizes every record; failures are collected, never fatal to the batch.
    pub fn normalize_batch<'a, I>(&self, raws: I) -> NormalizedBatch
    where
        I: IntoIterator<Item = &'a RawMealRecord>,
    {
        let mut batch = NormalizedBatch::default();
        for (index, raw) in raws.into_iter().enumerate() {
            match self.normalize(raw) {
                Ok(record) => batch.records.push(record),
                Err(error) => {
                    warn!(index, error = %error, "skipping meal record");
                    batch.failures.push(NormalizationFailure {
                        index,
                        error,
                        raw: raw.clone(),
                    });
                }
            }
        }
        batch
    }
}

/// Normalizes with UTC as the default offset.
pub fn normalize(raw: &RawMealRecord) -> Result<MealRecord, NormalizationError> {
    Normalizer::default().normalize(raw)
}

fn normalize_food(food: RawFoodItem<'_>) -> FoodItem {
    let nutrient = |keys: &[&str]| food.first_number(keys).map_or(0.0, |v| v.max(0.0));
    FoodItem {
        name: food.first_text(FOOD_NAME_KEYS).map(str::to_owned),
        calories: nutrient(FOOD_KCAL_KEYS),
        carbs: nutrient(FOOD_CARBS_KEYS),
        protein: nutrient(FOOD_PROTEIN_KEYS),
        fat: nutrient(FOOD_FAT_KEYS),
        sodium: nutrient(FOOD_SODIUM_KEYS),
        fiber: nutrient(FOOD_FIBER_KEYS),
        quantity: coerce_quantity(food.first_number(FOOD_QUANTITY_KEYS)),
        category: FoodCategory::from_raw(food.first_text(FOOD_CATEGORY_KEYS)),
        amount_grams: food.first_positive(FOOD_AMOUNT_KEYS),
    }
}

// First usable candidate; a bare number or bool is kept as its JSON text.
fn meal_type_label(raw: &RawMealRecord) -> Option<Cow<'_, str>> {
    raw.candidates(MEAL_TYPE_KEYS).find_map(|v| match v {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(Cow::Borrowed),
        Value::Number(_) | Value::Bool(_) => Some(Cow::Owned(v.to_string())),
        _ => None,
    })
}

fn coerce_quantity(raw: Option<f64>) -> u32 {
    match raw.map(f64::trunc) {
        Some(q) if q >= 1.0 => q.min(f64::from(u32::MAX)) as u32,
        _ => 1,
    }
}

// Stable across calls so repeated normalization of the same payload agrees.
fn derived_id(raw: &RawMealRecord) -> RecordId {
    let bytes = serde_json::to_vec(&raw.0).unwrap_or_default();
    RecordId::Text(Uuid::new_v5(&Uuid::NAMESPACE_OID, &bytes).to_string())
}
