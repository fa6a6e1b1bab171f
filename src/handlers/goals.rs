use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::models::goal::{CreateGoalRequest, Goal, UpdateGoalRequest};
use crate::AppState;

pub async fn create_goal(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateGoalRequest>,
) -> AppResult<Json<Goal>> {
    body.validate()?;

    let goal = body.into_goal(Utc::now());
    state.store.insert_goal(&goal).await?;

    tracing::debug!(goal_id = %goal.id, user_id = %goal.user_id, "Goal created");
    Ok(Json(goal))
}

pub async fn list_goals(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<Goal>>> {
    let goals = state.store.find_goals(user_id).await?;
    Ok(Json(goals))
}

pub async fn update_goal(
    State(state): State<AppState>,
    AppPath(goal_id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateGoalRequest>,
) -> AppResult<Json<Goal>> {
    body.validate()?;

    let goal = state
        .store
        .update_goal(goal_id, &body)
        .await?
        .ok_or(AppError::NotFound("Goal not found".into()))?;

    Ok(Json(goal))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    AppPath(goal_id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let deleted = state.store.delete_goal(goal_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Goal not found".into()));
    }

    Ok(Json(json!({ "deleted": true, "id": goal_id })))
}
