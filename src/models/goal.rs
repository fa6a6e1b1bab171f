use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub goal_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(rename = "type")]
    pub goal_type: String,
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
}

impl CreateGoalRequest {
    pub fn into_goal(self, now: DateTime<Utc>) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            title: self.title,
            goal_type: self.goal_type,
            target_date: self.target_date,
            is_completed: self.is_completed,
            created_at: now,
        }
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub goal_type: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub is_completed: Option<bool>,
}

impl UpdateGoalRequest {
    pub fn apply_to(&self, goal: &mut Goal) {
        if let Some(title) = &self.title {
            goal.title = title.clone();
        }
        if let Some(goal_type) = &self.goal_type {
            goal.goal_type = goal_type.clone();
        }
        if let Some(target_date) = self.target_date {
            goal.target_date = Some(target_date);
        }
        if let Some(is_completed) = self.is_completed {
            goal.is_completed = is_completed;
        }
    }
}
