use serde::{Deserialize, Serialize};
use time::Date;

use crate::nutrition::{
    targets::{IntakeProgress, MacroTargets, Profile},
    Totals,
};

#[derive(Debug, Deserialize)]
pub struct TargetsRequest {
    pub profile: Profile,
    /// Defaults to the current date in the configured offset.
    pub today: Option<Date>,
    /// Intake so far; progress is only reported when present.
    pub intake: Option<Totals>,
}

#[derive(Debug, Serialize)]
pub struct TargetsResponse {
    pub today: Date,
    pub recommended_calories: u32,
    pub macros: MacroTargets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<IntakeProgress>,
}
