use std::{
    borrow::Cow,
    iter::Sum,
    ops::{Add, AddAssign},
};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use time::OffsetDateTime;

/// Identifier carried over from the raw record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Number),
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| RecordId::Text(s.to_owned()))
            }
            _ => None,
        }
    }
}

/// Meal slot. Unrecognized labels keep the original text for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Unknown(Option<String>),
}

impl MealType {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(label) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return MealType::Unknown(None);
        };
        match label {
            "아침" => return MealType::Breakfast,
            "점심" => return MealType::Lunch,
            "저녁" => return MealType::Dinner,
            "간식" => return MealType::Snack,
            _ => {}
        }
        match label.to_ascii_uppercase().as_str() {
            "BREAKFAST" => MealType::Breakfast,
            "LUNCH" => MealType::Lunch,
            "DINNER" => MealType::Dinner,
            "SNACK" => MealType::Snack,
            _ => MealType::Unknown(Some(label.to_owned())),
        }
    }

    pub fn label(&self) -> Cow<'static, str> {
        match self {
            MealType::Breakfast => Cow::Borrowed("BREAKFAST"),
            MealType::Lunch => Cow::Borrowed("LUNCH"),
            MealType::Dinner => Cow::Borrowed("DINNER"),
            MealType::Snack => Cow::Borrowed("SNACK"),
            MealType::Unknown(None) => Cow::Borrowed("UNKNOWN"),
            MealType::Unknown(Some(original)) => Cow::Owned(format!("UNKNOWN:{original}")),
        }
    }
}

impl Serialize for MealType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FoodCategory {
    Korean,
    Chinese,
    Japanese,
    Western,
    Snack,
    Beverage,
    Etc,
}

impl FoodCategory {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(label) = raw.map(str::trim) else {
            return FoodCategory::Etc;
        };
        match label {
            "한식" => FoodCategory::Korean,
            "중식" => FoodCategory::Chinese,
            "일식" => FoodCategory::Japanese,
            "양식" => FoodCategory::Western,
            "분식" => FoodCategory::Snack,
            "음료" => FoodCategory::Beverage,
            other => match other.to_ascii_uppercase().as_str() {
                "KOREAN" => FoodCategory::Korean,
                "CHINESE" => FoodCategory::Chinese,
                "JAPANESE" => FoodCategory::Japanese,
                "WESTERN" => FoodCategory::Western,
                "SNACK" => FoodCategory::Snack,
                "BEVERAGE" => FoodCategory::Beverage,
                _ => FoodCategory::Etc,
            },
        }
    }
}

/// Calories (kcal) and macronutrient grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
}

impl Totals {
    pub const ZERO: Totals = Totals {
        calories: 0.0,
        carbs: 0.0,
        protein: 0.0,
        fat: 0.0,
    };

    /// One decimal place per field. Only for values about to be reported.
    pub fn rounded(self) -> Self {
        let round = |v: f64| {
            let r = (v * 10.0).round() / 10.0;
            if r.is_finite() {
                r
            } else {
                v
            }
        };
        Totals {
            calories: round(self.calories),
            carbs: round(self.carbs),
            protein: round(self.protein),
            fat: round(self.fat),
        }
    }
}

/// Clamps an overflowed sum or product of non-negative amounts to `f64::MAX`.
pub(crate) fn saturate(v: f64) -> f64 {
    if v.is_infinite() {
        f64::MAX
    } else {
        v
    }
}

impl Add for Totals {
    type Output = Totals;

    fn add(self, rhs: Totals) -> Totals {
        Totals {
            calories: saturate(self.calories + rhs.calories),
            carbs: saturate(self.carbs + rhs.carbs),
            protein: saturate(self.protein + rhs.protein),
            fat: saturate(self.fat + rhs.fat),
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, rhs: Totals) {
        *self = *self + rhs;
    }
}

impl Sum for Totals {
    fn sum<I: Iterator<Item = Totals>>(iter: I) -> Totals {
        iter.fold(Totals::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Totals> for Totals {
    fn sum<I: Iterator<Item = &'a Totals>>(iter: I) -> Totals {
        iter.copied().sum()
    }
}

/// Record-level totals the source supplied explicitly. Only values > 0 are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DeclaredTotals {
    pub calories: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
}

impl DeclaredTotals {
    pub fn new(
        calories: Option<f64>,
        carbs: Option<f64>,
        protein: Option<f64>,
        fat: Option<f64>,
    ) -> Self {
        let positive = |v: Option<f64>| v.filter(|v| *v > 0.0);
        Self {
            calories: positive(calories),
            carbs: positive(carbs),
            protein: positive(protein),
            fat: positive(fat),
        }
    }
}

/// One canonical food line. Nutrients are per unit and never negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodItem {
    pub(super) name: Option<String>,
    pub(super) calories: f64,
    pub(super) carbs: f64,
    pub(super) protein: f64,
    pub(super) fat: f64,
    pub(super) sodium: f64,
    pub(super) fiber: f64,
    pub(super) quantity: u32,
    pub(super) category: FoodCategory,
    pub(super) amount_grams: Option<f64>,
}

impl FoodItem {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn calories(&self) -> f64 {
        self.calories
    }
    pub fn carbs(&self) -> f64 {
        self.carbs
    }
    pub fn protein(&self) -> f64 {
        self.protein
    }
    pub fn fat(&self) -> f64 {
        self.fat
    }
    pub fn sodium(&self) -> f64 {
        self.sodium
    }
    pub fn fiber(&self) -> f64 {
        self.fiber
    }
    /// Always >= 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
    pub fn category(&self) -> FoodCategory {
        self.category
    }
    pub fn amount_grams(&self) -> Option<f64> {
        self.amount_grams
    }
}

/// Canonical meal record. Built only by the normalizer and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealRecord {
    pub(super) id: RecordId,
    #[serde(with = "time::serde::rfc3339")]
    pub(super) timestamp: OffsetDateTime,
    pub(super) meal_type: MealType,
    pub(super) foods: Vec<FoodItem>,
    pub(super) declared: DeclaredTotals,
    pub(super) totals: Totals,
    pub(super) record_weight: Option<f64>,
    pub(super) memo: Option<String>,
    pub(super) image_url: Option<String>,
}

impl MealRecord {
    pub fn id(&self) -> &RecordId {
        &self.id
    }
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }
    pub fn meal_type(&self) -> &MealType {
        &self.meal_type
    }
    pub fn foods(&self) -> &[FoodItem] {
        &self.foods
    }
    pub fn declared(&self) -> &DeclaredTotals {
        &self.declared
    }
    pub fn totals(&self) -> Totals {
        self.totals
    }
    pub fn record_weight(&self) -> Option<f64> {
        self.record_weight
    }
    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}
