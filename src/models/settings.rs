use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// `None` only on a synthesized default that has never been stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub notifications_enabled: bool,
    pub dark_mode_enabled: bool,
    pub reminder_time: DateTime<Utc>,
    pub language_code: String,
}

impl UserSettings {
    /// Returned for users who never saved settings. Not persisted.
    pub fn default_for(user_id: Uuid) -> Self {
        Self {
            id: None,
            user_id,
            notifications_enabled: true,
            dark_mode_enabled: false,
            reminder_time: default_reminder_time(),
            language_code: "en".into(),
        }
    }
}

/// 09:00 UTC on the zero date (0001-01-01); only the time of day is meaningful.
pub fn default_reminder_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettingsRequest {
    pub user_id: Uuid,
    pub notifications_enabled: bool,
    pub dark_mode_enabled: bool,
    pub reminder_time: DateTime<Utc>,
    #[validate(length(min = 1, message = "languageCode is required"))]
    pub language_code: String,
}

impl SaveSettingsRequest {
    pub fn into_settings(self) -> UserSettings {
        UserSettings {
            id: None,
            user_id: self.user_id,
            notifications_enabled: self.notifications_enabled,
            dark_mode_enabled: self.dark_mode_enabled,
            reminder_time: self.reminder_time,
            language_code: self.language_code,
        }
    }
}
