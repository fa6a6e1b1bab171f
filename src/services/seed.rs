use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::content::{Affirmation, Meditation, SeedBatch, WellnessTip};
use crate::store::{Store, StoreResult};

// (content, category)
const TIPS: &[(&str, &str)] = &[
    ("Focus on one goal every day. Small steps lead to big results.", "Motivation"),
    ("Take a small step today toward realizing your dreams.", "Motivation"),
    ("Failures are learning opportunities, embrace them.", "Motivation"),
    ("Try to meditate for at least 10 minutes every day.", "Mindfulness"),
    (
        "When you're struggling, focus on your breath and take a few deep breaths.",
        "Mindfulness",
    ),
    (
        "Be kind to yourself, focus on progress rather than seeking perfection.",
        "SelfCare",
    ),
    ("Spend at least 30 minutes in nature every day.", "SelfCare"),
    ("Be grateful for three things you do every day.", "Positivity"),
    ("Enjoy the little moments that make you happy.", "Positivity"),
];

// (title, description, minutes, type, image)
const MEDITATIONS: &[(&str, &str, i32, &str, &str)] = &[
    (
        "Morning Focus",
        "A short meditation to start your day with energy",
        5,
        "Focus",
        "sunrise.fill",
    ),
    (
        "Deep Focus",
        "Concentration-enhancing meditation before work",
        10,
        "Focus",
        "lightbulb.fill",
    ),
    (
        "Peaceful Sleep",
        "Bedtime meditation for restful sleep",
        10,
        "Sleep",
        "moon.zzz.fill",
    ),
    (
        "Anxiety Reduction",
        "Breathing techniques for calming anxiety",
        8,
        "Anxiety",
        "waveform.path",
    ),
    (
        "Inner Peace",
        "Meditation to help find inner peace",
        15,
        "Calm",
        "leaf.fill",
    ),
];

const AFFIRMATIONS: &[&str] = &[
    "I am valuable and deserve to be loved.",
    "Every day, in every way, I am getting better and stronger.",
    "I have the power to overcome challenges.",
    "I can change my life in a positive way.",
    "I am good enough and I accept myself as I am.",
    "I feel grateful for today and every day.",
    "I have the power to create my own happiness.",
    "I radiate positive energy and attract positive energy.",
    "I am at peace.",
    "I love myself more each day.",
    "I am the architect of my life and make positive choices.",
    "I am fully present here and now, enjoying the moment.",
    "My worth is determined by who I am, not by my achievements.",
    "I approach myself with compassion and understanding.",
    "Every challenge strengthens and grows me.",
];

/// The fixed reference content, with fresh ids and `now` as creation time.
pub fn reference_batches(now: DateTime<Utc>) -> Vec<SeedBatch> {
    let tips = TIPS
        .iter()
        .map(|(content, category)| WellnessTip {
            id: Uuid::new_v4(),
            content: content.to_string(),
            category: category.to_string(),
            created_at: now,
        })
        .collect();

    let meditations = MEDITATIONS
        .iter()
        .map(|(title, description, minutes, kind, image)| Meditation {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            duration_minutes: *minutes,
            meditation_type: kind.to_string(),
            image_ref: image.to_string(),
        })
        .collect();

    let affirmations = AFFIRMATIONS
        .iter()
        .map(|content| Affirmation {
            id: Uuid::new_v4(),
            content: content.to_string(),
            created_at: now,
        })
        .collect();

    vec![
        SeedBatch::WellnessTips(tips),
        SeedBatch::Meditations(meditations),
        SeedBatch::Affirmations(affirmations),
    ]
}

/// Fills every empty reference collection. Collections that already hold
/// records are left untouched, so repeated calls are no-ops. Returns the
/// total number of records inserted.
pub async fn seed_reference_content(store: &dyn Store, now: DateTime<Utc>) -> StoreResult<u64> {
    let mut total = 0;

    for batch in reference_batches(now) {
        let collection = batch.collection().table();
        let inserted = store.seed_if_empty(&batch).await?;
        if inserted > 0 {
            tracing::info!(collection, inserted, "Seeded reference collection");
        } else {
            tracing::debug!(collection, "Reference collection already populated");
        }
        total += inserted;
    }

    Ok(total)
}
