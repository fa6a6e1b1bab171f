use axum::{extract::State, Json};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::models::settings::{SaveSettingsRequest, UserSettings};
use crate::services::settings;
use crate::AppState;

pub async fn save_settings(
    State(state): State<AppState>,
    AppJson(body): AppJson<SaveSettingsRequest>,
) -> AppResult<Json<UserSettings>> {
    body.validate()?;
    let saved = settings::save_settings(state.store.as_ref(), body).await?;
    Ok(Json(saved))
}

pub async fn get_settings(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<UserSettings>> {
    let found = settings::settings_for(state.store.as_ref(), user_id).await?;
    Ok(Json(found))
}
