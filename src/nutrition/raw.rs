use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Candidate keys per logical field, highest priority first.
pub const ID_KEYS: &[&str] = &["id", "mealId"];
pub const DATE_KEYS: &[&str] = &["modifiedAt", "createDate", "createdDate", "date"];
pub const MEAL_TYPE_KEYS: &[&str] = &["mealType", "type"];
pub const TOTAL_KCAL_KEYS: &[&str] = &["totalKcal", "calories", "totalCalories"];
pub const TOTAL_CARBS_KEYS: &[&str] = &["totalCarbs", "carbohydrate", "carbs"];
pub const TOTAL_PROTEIN_KEYS: &[&str] = &["totalProtein", "protein"];
pub const TOTAL_FAT_KEYS: &[&str] = &["totalFat", "fat"];
pub const WEIGHT_KEYS: &[&str] = &["recordWeight", "record_weight"];
pub const MEMO_KEYS: &[&str] = &["memo"];
pub const IMAGE_KEYS: &[&str] = &["imageUrl"];
pub const FOODS_KEY: &str = "foods";

pub const FOOD_NAME_KEYS: &[&str] = &["foodName", "name"];
pub const FOOD_KCAL_KEYS: &[&str] = &["calories", "kcal"];
pub const FOOD_CARBS_KEYS: &[&str] = &["carbohydrate", "carbohydrates", "carbs"];
pub const FOOD_PROTEIN_KEYS: &[&str] = &["protein"];
pub const FOOD_FAT_KEYS: &[&str] = &["fat"];
pub const FOOD_SODIUM_KEYS: &[&str] = &["sodium"];
pub const FOOD_FIBER_KEYS: &[&str] = &["fiber"];
pub const FOOD_QUANTITY_KEYS: &[&str] = &["quantity"];
pub const FOOD_CATEGORY_KEYS: &[&str] = &["foodCategory"];
pub const FOOD_AMOUNT_KEYS: &[&str] = &["totalAmount", "gram"];

/// Untrusted meal payload exactly as an upstream source delivered it.
///
/// Anything that is not a JSON object behaves as a record with no fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMealRecord(pub Value);

/// Borrowed view over one entry of a raw record's `foods` array.
#[derive(Debug, Clone, Copy)]
pub struct RawFoodItem<'a>(&'a Map<String, Value>);

/// Lookup over loosely shaped JSON objects. `null` counts as absent.
pub trait RawFields {
    fn field(&self, key: &str) -> Option<&Value>;

    /// Present values for `keys`, in priority order.
    fn candidates<'k>(&'k self, keys: &'k [&'k str]) -> Box<dyn Iterator<Item = &'k Value> + 'k> {
        Box::new(keys.iter().filter_map(move |k| self.field(k)))
    }

    fn first_number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().filter_map(|k| self.field(k)).find_map(as_number)
    }

    fn first_positive(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|k| self.field(k))
            .filter_map(as_number)
            .find(|v| *v > 0.0)
    }

    fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.field(k))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

impl RawMealRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Object entries of `foods`; anything else in the array is skipped.
    pub fn foods(&self) -> impl Iterator<Item = RawFoodItem<'_>> {
        self.field(FOODS_KEY)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_object().map(RawFoodItem))
    }

    pub fn food_entry_count(&self) -> usize {
        self.field(FOODS_KEY)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

impl From<Value> for RawMealRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl RawFields for RawMealRecord {
    fn field(&self, key: &str) -> Option<&Value> {
        self.0.as_object()?.get(key).filter(|v| !v.is_null())
    }
}

impl RawFields for RawFoodItem<'_> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }
}

/// Numbers pass through; strings yield their leading number (`"12.5g"` → 12.5).
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

fn leading_number(s: &str) -> Option<f64> {
    lazy_static! {
        static ref LEADING_NUMBER: Regex =
            Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))").unwrap();
    }
    LEADING_NUMBER
        .captures(s)
        .and_then(|c| c[1].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
