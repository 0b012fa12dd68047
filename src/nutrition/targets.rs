//! Daily intake targets from a member profile.
//!
//! Calories follow the Mifflin-St Jeor BMR scaled by an activity factor; the
//! macro split is 45 % carbohydrate, 25 % protein and 30 % fat by energy.

use serde::{Deserialize, Serialize};
use time::Date;

use super::{error::TargetError, model::Totals};

const KCAL_PER_GRAM_CARBS: f64 = 4.0;
const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

const CARBS_SHARE: f64 = 0.45;
const PROTEIN_SHARE: f64 = 0.25;
const FAT_SHARE: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Gender {
    Male,
    Female,
}

impl TryFrom<String> for Gender {
    type Error = TargetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim() {
            "남성" => Ok(Gender::Male),
            "여성" => Ok(Gender::Female),
            other => match other.to_ascii_uppercase().as_str() {
                "MALE" | "M" => Ok(Gender::Male),
                "FEMALE" | "F" => Ok(Gender::Female),
                _ => Err(TargetError::UnknownGender(value)),
            },
        }
    }
}

/// Unrecognized labels fall back to `Moderate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum ActivityLevel {
    Low,
    #[default]
    Moderate,
    High,
}

impl From<String> for ActivityLevel {
    fn from(value: String) -> Self {
        match value.trim() {
            "조금 활동적" => ActivityLevel::Low,
            "매우 활동적" => ActivityLevel::High,
            other => match other.to_ascii_uppercase().as_str() {
                "LOW" => ActivityLevel::Low,
                "HIGH" => ActivityLevel::High,
                _ => ActivityLevel::Moderate,
            },
        }
    }
}

impl ActivityLevel {
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Low => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::High => 1.725,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(alias = "birthAt")]
    pub birth_date: Date,
    pub gender: Gender,
    #[serde(alias = "height")]
    pub height_cm: f64,
    #[serde(alias = "weight")]
    pub weight_kg: f64,
    #[serde(default, alias = "activityLevel")]
    pub activity_level: ActivityLevel,
}

impl Profile {
    /// Calendar-year difference, not counting whether the birthday has passed.
    pub fn age_on(&self, today: Date) -> i32 {
        today.year() - self.birth_date.year()
    }

    pub fn bmr(&self, today: Date) -> f64 {
        let offset = match self.gender {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
        };
        10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * f64::from(self.age_on(today)) + offset
    }

    fn validate(&self, today: Date) -> Result<(), TargetError> {
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(TargetError::invalid("height must be positive"));
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(TargetError::invalid("weight must be positive"));
        }
        if self.birth_date > today {
            return Err(TargetError::invalid("birth date is in the future"));
        }
        Ok(())
    }
}

/// Recommended daily energy intake in kcal, rounded to the nearest integer.
pub fn recommended_calories(profile: &Profile, today: Date) -> Result<u32, TargetError> {
    profile.validate(today)?;
    let kcal = (profile.bmr(today) * profile.activity_level.factor()).round();
    if kcal < 1.0 {
        return Err(TargetError::invalid("profile yields no energy requirement"));
    }
    Ok(kcal.min(f64::from(u32::MAX)) as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacroTargets {
    pub carbs_g: u32,
    pub protein_g: u32,
    pub fat_g: u32,
}

impl MacroTargets {
    pub fn from_calories(kcal: u32) -> Self {
        let grams = |share: f64, per_gram: f64| (f64::from(kcal) * share / per_gram).round() as u32;
        Self {
            carbs_g: grams(CARBS_SHARE, KCAL_PER_GRAM_CARBS),
            protein_g: grams(PROTEIN_SHARE, KCAL_PER_GRAM_PROTEIN),
            fat_g: grams(FAT_SHARE, KCAL_PER_GRAM_FAT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTargets {
    pub recommended_calories: u32,
    pub macros: MacroTargets,
}

impl DailyTargets {
    pub fn for_profile(profile: &Profile, today: Date) -> Result<Self, TargetError> {
        let recommended_calories = recommended_calories(profile, today)?;
        Ok(Self {
            recommended_calories,
            macros: MacroTargets::from_calories(recommended_calories),
        })
    }
}

/// Intake as a share of target, in whole percent capped at 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntakeProgress {
    pub calories_pct: u8,
    pub carbs_pct: u8,
    pub protein_pct: u8,
    pub fat_pct: u8,
    pub remaining_calories: f64,
}

impl IntakeProgress {
    pub fn compute(intake: Totals, targets: &DailyTargets) -> Self {
        let target_kcal = f64::from(targets.recommended_calories);
        Self {
            calories_pct: percent(intake.calories, target_kcal),
            carbs_pct: percent(intake.carbs, f64::from(targets.macros.carbs_g)),
            protein_pct: percent(intake.protein, f64::from(targets.macros.protein_g)),
            fat_pct: percent(intake.fat, f64::from(targets.macros.fat_g)),
            remaining_calories: (target_kcal - intake.calories).max(0.0),
        }
    }
}

fn percent(current: f64, target: f64) -> u8 {
    if target <= 0.0 {
        return 0;
    }
    (current / target * 100.0).round().clamp(0.0, 100.0) as u8
}
