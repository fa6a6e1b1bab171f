use axum::{extract::State, Json};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::models::user::{User, UserNameRequest};
use crate::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    AppJson(body): AppJson<UserNameRequest>,
) -> AppResult<Json<User>> {
    body.validate()?;

    let user = User::new(body.name, Utc::now());
    state.store.insert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<User>> {
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(body): AppJson<UserNameRequest>,
) -> AppResult<Json<User>> {
    body.validate()?;

    let user = state
        .store
        .rename_user(user_id, &body.name)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(user))
}
