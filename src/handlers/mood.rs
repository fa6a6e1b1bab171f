use axum::{extract::State, Json};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::models::mood::{LogMoodRequest, MoodEntry};
use crate::services::mood;
use crate::AppState;

pub async fn log_mood(
    State(state): State<AppState>,
    AppJson(body): AppJson<LogMoodRequest>,
) -> AppResult<Json<MoodEntry>> {
    body.validate()?;

    let offset = state.config.reference_offset()?;
    let entry = mood::log_mood(state.store.as_ref(), body, offset, Utc::now()).await?;

    Ok(Json(entry))
}

pub async fn mood_history(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let entries = mood::mood_history(state.store.as_ref(), user_id, Utc::now()).await?;
    Ok(Json(entries))
}
