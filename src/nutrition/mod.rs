//! Meal nutrition engine: raw payload normalization, totals, and period views.
//!
//! Everything here is pure and synchronous. Records are normalized once by
//! [`Normalizer`] and only read afterwards.

pub mod aggregator;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod period;
pub mod raw;
pub mod report;
pub mod targets;
pub mod timestamp;

pub use aggregator::{aggregate, aggregate_many};
pub use error::{NormalizationError, TargetError};
pub use model::{DeclaredTotals, FoodCategory, FoodItem, MealRecord, MealType, RecordId, Totals};
pub use normalizer::{normalize, NormalizationFailure, NormalizedBatch, Normalizer};
pub use period::{query, DateRange, PeriodResolver};
pub use raw::RawMealRecord;
pub use report::{DayGroup, FastingGap, MealTypeCounts, MonthlyReport, WeightPoint};
