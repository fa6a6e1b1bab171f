use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::content::{
    Affirmation, Collection, ContentRecord, Meditation, SeedBatch, WellnessTip,
};
use crate::models::goal::{Goal, UpdateGoalRequest};
use crate::models::message::Message;
use crate::models::mood::{DayWindow, MoodEntry};
use crate::models::settings::UserSettings;
use crate::models::user::User;

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    moods: Vec<MoodEntry>,
    goals: Vec<Goal>,
    messages: Vec<Message>,
    settings: Vec<UserSettings>,
    meditations: Vec<Meditation>,
    tips: Vec<WellnessTip>,
    affirmations: Vec<Affirmation>,
}

/// Process-local store. Every write takes the single write lock, which is
/// what makes upserts and seeding atomic here.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut c = self.inner.write().await;
        if c.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::Conflict("users"));
        }
        c.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let c = self.inner.read().await;
        Ok(c.users.iter().find(|u| u.id == id).cloned())
    }

    async fn rename_user(&self, id: Uuid, name: &str) -> StoreResult<Option<User>> {
        let mut c = self.inner.write().await;
        Ok(c.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.name = name.to_string();
            u.clone()
        }))
    }

    async fn upsert_mood_for_day(
        &self,
        candidate: &MoodEntry,
        window: &DayWindow,
    ) -> StoreResult<MoodEntry> {
        let mut c = self.inner.write().await;
        if let Some(entry) = c
            .moods
            .iter_mut()
            .find(|m| m.user_id == candidate.user_id && window.contains(m.date))
        {
            entry.mood = candidate.mood.clone();
            entry.date = candidate.date;
            return Ok(entry.clone());
        }

        c.moods.push(candidate.clone());
        Ok(candidate.clone())
    }

    async fn find_moods_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<MoodEntry>> {
        let c = self.inner.read().await;
        let mut entries: Vec<MoodEntry> = c
            .moods
            .iter()
            .filter(|m| m.user_id == user_id && m.date >= since)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn insert_goal(&self, goal: &Goal) -> StoreResult<()> {
        let mut c = self.inner.write().await;
        if c.goals.iter().any(|g| g.id == goal.id) {
            return Err(StoreError::Conflict("goals"));
        }
        c.goals.push(goal.clone());
        Ok(())
    }

    async fn find_goals(&self, user_id: Uuid) -> StoreResult<Vec<Goal>> {
        let c = self.inner.read().await;
        Ok(c.goals.iter().filter(|g| g.user_id == user_id).cloned().collect())
    }

    async fn update_goal(&self, id: Uuid, patch: &UpdateGoalRequest) -> StoreResult<Option<Goal>> {
        let mut c = self.inner.write().await;
        Ok(c.goals.iter_mut().find(|g| g.id == id).map(|g| {
            patch.apply_to(g);
            g.clone()
        }))
    }

    async fn delete_goal(&self, id: Uuid) -> StoreResult<u64> {
        let mut c = self.inner.write().await;
        let before = c.goals.len();
        c.goals.retain(|g| g.id != id);
        Ok((before - c.goals.len()) as u64)
    }

    async fn insert_messages(&self, messages: &[Message]) -> StoreResult<u64> {
        let mut c = self.inner.write().await;
        let mut seen: HashSet<Uuid> = c.messages.iter().map(|m| m.id).collect();
        for message in messages {
            if !seen.insert(message.id) {
                return Err(StoreError::Conflict("messages"));
            }
        }
        c.messages.extend_from_slice(messages);
        Ok(messages.len() as u64)
    }

    async fn find_messages(&self, user_id: Uuid) -> StoreResult<Vec<Message>> {
        let c = self.inner.read().await;
        let mut messages: Vec<Message> = c
            .messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn upsert_settings(&self, settings: &UserSettings) -> StoreResult<UserSettings> {
        let mut c = self.inner.write().await;
        if let Some(existing) = c.settings.iter_mut().find(|s| s.user_id == settings.user_id) {
            existing.notifications_enabled = settings.notifications_enabled;
            existing.dark_mode_enabled = settings.dark_mode_enabled;
            existing.reminder_time = settings.reminder_time;
            existing.language_code = settings.language_code.clone();
            return Ok(existing.clone());
        }

        let mut stored = settings.clone();
        stored.id = Some(settings.id.unwrap_or_else(Uuid::new_v4));
        c.settings.push(stored.clone());
        Ok(stored)
    }

    async fn find_settings(&self, user_id: Uuid) -> StoreResult<Option<UserSettings>> {
        let c = self.inner.read().await;
        Ok(c.settings.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn count(&self, collection: Collection) -> StoreResult<i64> {
        let c = self.inner.read().await;
        let n = match collection {
            Collection::Meditations => c.meditations.len(),
            Collection::WellnessTips => c.tips.len(),
            Collection::Affirmations => c.affirmations.len(),
        };
        Ok(n as i64)
    }

    async fn seed_if_empty(&self, batch: &SeedBatch) -> StoreResult<u64> {
        let mut c = self.inner.write().await;
        let inserted = match batch {
            SeedBatch::Meditations(items) if c.meditations.is_empty() => {
                c.meditations.extend_from_slice(items);
                items.len()
            }
            SeedBatch::WellnessTips(items) if c.tips.is_empty() => {
                c.tips.extend_from_slice(items);
                items.len()
            }
            SeedBatch::Affirmations(items) if c.affirmations.is_empty() => {
                c.affirmations.extend_from_slice(items);
                items.len()
            }
            _ => 0,
        };
        Ok(inserted as u64)
    }

    async fn find_meditations(&self, meditation_type: Option<&str>) -> StoreResult<Vec<Meditation>> {
        let c = self.inner.read().await;
        Ok(c.meditations
            .iter()
            .filter(|m| meditation_type.map_or(true, |t| m.meditation_type == t))
            .cloned()
            .collect())
    }

    async fn find_tips(&self, category: Option<&str>) -> StoreResult<Vec<WellnessTip>> {
        let c = self.inner.read().await;
        Ok(c.tips
            .iter()
            .filter(|t| category.map_or(true, |cat| t.category == cat))
            .cloned()
            .collect())
    }

    async fn find_affirmations(&self) -> StoreResult<Vec<Affirmation>> {
        let c = self.inner.read().await;
        Ok(c.affirmations.clone())
    }

    async fn record_at(
        &self,
        collection: Collection,
        offset: i64,
    ) -> StoreResult<Option<ContentRecord>> {
        let Ok(offset) = usize::try_from(offset) else {
            return Ok(None);
        };
        let c = self.inner.read().await;
        let record = match collection {
            Collection::Meditations => {
                nth_by_id(&c.meditations, |m| m.id, offset).map(ContentRecord::Meditation)
            }
            Collection::WellnessTips => {
                nth_by_id(&c.tips, |t| t.id, offset).map(ContentRecord::WellnessTip)
            }
            Collection::Affirmations => {
                nth_by_id(&c.affirmations, |a| a.id, offset).map(ContentRecord::Affirmation)
            }
        };
        Ok(record)
    }
}

fn nth_by_id<T: Clone>(items: &[T], id: impl Fn(&T) -> Uuid, offset: usize) -> Option<T> {
    let mut ordered: Vec<&T> = items.iter().collect();
    ordered.sort_by_key(|item| id(item));
    ordered.get(offset).map(|item| (*item).clone())
}
