use anyhow::anyhow;
use rand::Rng;

use crate::error::{AppError, AppResult};
use crate::models::content::{Affirmation, Collection, ContentRecord};
use crate::store::Store;

/// Picks one record of `collection` uniformly at random.
///
/// Count-then-offset over the id-ordered collection: the store pins the
/// iteration order, so every record is reachable by exactly one offset.
pub async fn random_record<R>(
    store: &dyn Store,
    collection: Collection,
    rng: &mut R,
) -> AppResult<ContentRecord>
where
    R: Rng + Send,
{
    let not_found = || AppError::NotFound(format!("No {} found", collection.label()));

    let total = store.count(collection).await?;
    if total == 0 {
        return Err(not_found());
    }

    let offset = rng.gen_range(0..total);
    let record = store
        .record_at(collection, offset)
        .await?
        .ok_or_else(not_found)?;

    tracing::debug!(collection = collection.table(), id = %record.id(), "Random record selected");
    Ok(record)
}

pub async fn random_affirmation<R>(store: &dyn Store, rng: &mut R) -> AppResult<Affirmation>
where
    R: Rng + Send,
{
    match random_record(store, Collection::Affirmations, rng).await? {
        ContentRecord::Affirmation(affirmation) => Ok(affirmation),
        other => Err(AppError::Internal(anyhow!(
            "affirmations lookup returned a record from {}",
            other.collection().table()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::{SeedBatch, WellnessTip};
    use crate::store::MemoryStore;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use uuid::Uuid;

    async fn seeded_store(n: usize) -> MemoryStore {
        let store = MemoryStore::new();
        let now = Utc::now();
        let items = (0..n)
            .map(|i| Affirmation {
                id: Uuid::new_v4(),
                content: format!("affirmation {i}"),
                created_at: now,
            })
            .collect();
        store
            .seed_if_empty(&SeedBatch::Affirmations(items))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_empty_collection_is_not_found() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..3 {
            let err = random_affirmation(&store, &mut rng).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn test_single_record_is_always_returned() {
        let store = seeded_store(1).await;
        let only = store.find_affirmations().await.unwrap().remove(0);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..20 {
            assert_eq!(random_affirmation(&store, &mut rng).await.unwrap(), only);
        }
    }

    #[tokio::test]
    async fn test_draws_are_uniform() {
        const RECORDS: usize = 5;
        const DRAWS: usize = 10_000;
        // Chi-square critical value, 4 degrees of freedom, p = 0.001.
        const CRITICAL: f64 = 18.467;

        let store = seeded_store(RECORDS).await;
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut counts: HashMap<Uuid, usize> = HashMap::new();

        for _ in 0..DRAWS {
            let pick = random_affirmation(&store, &mut rng).await.unwrap();
            *counts.entry(pick.id).or_default() += 1;
        }

        assert_eq!(counts.len(), RECORDS, "every record should be drawn");

        let expected = DRAWS as f64 / RECORDS as f64;
        let chi_square: f64 = counts
            .values()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();

        assert!(
            chi_square < CRITICAL,
            "chi-square {chi_square:.2} exceeds {CRITICAL} for counts {counts:?}"
        );
    }

    #[tokio::test]
    async fn test_random_record_stays_in_named_collection() {
        let store = seeded_store(3).await;
        let tips: Vec<WellnessTip> = (0..2)
            .map(|i| WellnessTip {
                id: Uuid::new_v4(),
                content: format!("tip {i}"),
                category: "Mindfulness".into(),
                created_at: Utc::now(),
            })
            .collect();
        store
            .seed_if_empty(&SeedBatch::WellnessTips(tips.clone()))
            .await
            .unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let record = random_record(&store, Collection::WellnessTips, &mut rng)
                .await
                .unwrap();
            assert_eq!(record.collection(), Collection::WellnessTips);
            assert!(tips.iter().any(|t| t.id == record.id()));
        }

        let err = random_record(&store, Collection::Meditations, &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "No meditations found"));
    }
}
