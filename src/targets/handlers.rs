use axum::{extract::State, routing::post, Json, Router};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::dto::{TargetsRequest, TargetsResponse};
use crate::{
    error::ApiError,
    nutrition::targets::{DailyTargets, IntakeProgress},
    state::AppState,
};

pub fn target_routes() -> Router<AppState> {
    Router::new().route("/targets", post(daily_targets))
}

#[instrument(skip(state, body))]
pub async fn daily_targets(
    State(state): State<AppState>,
    Json(body): Json<TargetsRequest>,
) -> Result<Json<TargetsResponse>, ApiError> {
    let today = body
        .today
        .unwrap_or_else(|| OffsetDateTime::now_utc().to_offset(state.config.utc_offset).date());
    let targets = DailyTargets::for_profile(&body.profile, today)?;
    let progress = body
        .intake
        .map(|intake| IntakeProgress::compute(intake, &targets));

    info!(
        recommended_calories = targets.recommended_calories,
        with_progress = progress.is_some(),
        "daily targets"
    );
    Ok(Json(TargetsResponse {
        today,
        recommended_calories: targets.recommended_calories,
        macros: targets.macros,
        progress,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{
        targets::{ActivityLevel, Gender, Profile},
        Totals,
    };
    use time::macros::date;

    fn body(height_cm: f64, intake: Option<Totals>) -> TargetsRequest {
        TargetsRequest {
            profile: Profile {
                birth_date: date!(1994-03-10),
                gender: Gender::Male,
                height_cm,
                weight_kg: 75.0,
                activity_level: ActivityLevel::Moderate,
            },
            today: Some(date!(2024-01-02)),
            intake,
        }
    }

    #[tokio::test]
    async fn targets_with_progress() {
        let intake = Totals { calories: 1341.0, ..Totals::ZERO };
        let Json(resp) = daily_targets(State(AppState::fake()), Json(body(180.0, Some(intake))))
            .await
            .unwrap();
        assert_eq!(resp.recommended_calories, 2682);
        assert_eq!(resp.progress.map(|p| p.calories_pct), Some(50));
    }

    #[tokio::test]
    async fn invalid_profile_is_rejected() {
        let err = daily_targets(State(AppState::fake()), Json(body(-1.0, None)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTarget(_)));
    }
}
