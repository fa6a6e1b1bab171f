//! Read-only reference content: meditations, wellness tips and affirmations.
//! Records are only ever created by the startup seeder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meditation {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    #[serde(rename = "type")]
    pub meditation_type: String,
    pub image_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WellnessTip {
    pub id: Uuid,
    pub content: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Affirmation {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Meditations,
    WellnessTips,
    Affirmations,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::WellnessTips,
        Collection::Meditations,
        Collection::Affirmations,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Collection::Meditations => "meditations",
            Collection::WellnessTips => "wellness_tips",
            Collection::Affirmations => "affirmations",
        }
    }

    /// Name used in client-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Collection::Meditations => "meditations",
            Collection::WellnessTips => "wellness tips",
            Collection::Affirmations => "affirmations",
        }
    }
}

/// A single record from one of the reference collections.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRecord {
    Meditation(Meditation),
    WellnessTip(WellnessTip),
    Affirmation(Affirmation),
}

impl ContentRecord {
    pub fn id(&self) -> Uuid {
        match self {
            ContentRecord::Meditation(m) => m.id,
            ContentRecord::WellnessTip(t) => t.id,
            ContentRecord::Affirmation(a) => a.id,
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            ContentRecord::Meditation(_) => Collection::Meditations,
            ContentRecord::WellnessTip(_) => Collection::WellnessTips,
            ContentRecord::Affirmation(_) => Collection::Affirmations,
        }
    }
}

/// Records to insert into one reference collection if, and only if, it is
/// still empty.
#[derive(Debug, Clone)]
pub enum SeedBatch {
    Meditations(Vec<Meditation>),
    WellnessTips(Vec<WellnessTip>),
    Affirmations(Vec<Affirmation>),
}

impl SeedBatch {
    pub fn collection(&self) -> Collection {
        match self {
            SeedBatch::Meditations(_) => Collection::Meditations,
            SeedBatch::WellnessTips(_) => Collection::WellnessTips,
            SeedBatch::Affirmations(_) => Collection::Affirmations,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeedBatch::Meditations(v) => v.len(),
            SeedBatch::WellnessTips(v) => v.len(),
            SeedBatch::Affirmations(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
