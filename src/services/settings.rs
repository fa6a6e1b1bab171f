use uuid::Uuid;

use crate::error::AppResult;
use crate::models::settings::{SaveSettingsRequest, UserSettings};
use crate::store::Store;

/// Saves the user's single settings record, creating it on first save.
/// The record id never changes after creation.
pub async fn save_settings(
    store: &dyn Store,
    request: SaveSettingsRequest,
) -> AppResult<UserSettings> {
    let mut candidate = request.into_settings();
    let fresh_id = Uuid::new_v4();
    candidate.id = Some(fresh_id);

    let stored = store.upsert_settings(&candidate).await?;
    tracing::debug!(
        user_id = %stored.user_id,
        created = stored.id == Some(fresh_id),
        "User settings saved"
    );
    Ok(stored)
}

/// Stored settings, or the defaults when the user has never saved any.
/// The defaults are not written back.
pub async fn settings_for(store: &dyn Store, user_id: Uuid) -> AppResult<UserSettings> {
    let settings = store
        .find_settings(user_id)
        .await?
        .unwrap_or_else(|| UserSettings::default_for(user_id));
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::default_reminder_time;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Timelike, Utc};

    fn request(user_id: Uuid, dark_mode: bool, language: &str) -> SaveSettingsRequest {
        SaveSettingsRequest {
            user_id,
            notifications_enabled: false,
            dark_mode_enabled: dark_mode,
            reminder_time: Utc.with_ymd_and_hms(2025, 1, 1, 21, 30, 0).unwrap(),
            language_code: language.into(),
        }
    }

    #[tokio::test]
    async fn test_unsaved_user_gets_defaults_without_persisting() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();

        let settings = settings_for(&store, user_id).await.unwrap();

        assert_eq!(settings.id, None);
        assert_eq!(settings.user_id, user_id);
        assert!(settings.notifications_enabled);
        assert!(!settings.dark_mode_enabled);
        assert_eq!(settings.language_code, "en");
        assert_eq!(settings.reminder_time, default_reminder_time());
        assert_eq!(settings.reminder_time.hour(), 9);
        assert_eq!(settings.reminder_time.minute(), 0);
        assert!(store.find_settings(user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repeated_saves_keep_one_record_and_id() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();

        let first = save_settings(&store, request(user_id, false, "en"))
            .await
            .unwrap();
        let second = save_settings(&store, request(user_id, true, "tr"))
            .await
            .unwrap();

        assert!(first.id.is_some());
        assert_eq!(second.id, first.id);
        assert!(second.dark_mode_enabled);
        assert_eq!(second.language_code, "tr");

        let read = settings_for(&store, user_id).await.unwrap();
        assert_eq!(read, second);
    }

    #[tokio::test]
    async fn test_settings_are_per_user() {
        let store = MemoryStore::new();
        let a = save_settings(&store, request(Uuid::new_v4(), true, "en"))
            .await
            .unwrap();
        let b = save_settings(&store, request(Uuid::new_v4(), true, "en"))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
    }
}
