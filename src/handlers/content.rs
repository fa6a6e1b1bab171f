use axum::{extract::State, Json};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::AppResult;
use crate::extract::AppPath;
use crate::models::content::{Affirmation, Meditation, WellnessTip};
use crate::services::content;
use crate::AppState;

pub async fn list_meditations(State(state): State<AppState>) -> AppResult<Json<Vec<Meditation>>> {
    Ok(Json(state.store.find_meditations(None).await?))
}

pub async fn meditations_by_type(
    State(state): State<AppState>,
    AppPath(meditation_type): AppPath<String>,
) -> AppResult<Json<Vec<Meditation>>> {
    let meditations = state.store.find_meditations(Some(meditation_type.as_str())).await?;
    Ok(Json(meditations))
}

pub async fn list_tips(State(state): State<AppState>) -> AppResult<Json<Vec<WellnessTip>>> {
    Ok(Json(state.store.find_tips(None).await?))
}

pub async fn tips_by_category(
    State(state): State<AppState>,
    AppPath(category): AppPath<String>,
) -> AppResult<Json<Vec<WellnessTip>>> {
    Ok(Json(state.store.find_tips(Some(category.as_str())).await?))
}

pub async fn list_affirmations(State(state): State<AppState>) -> AppResult<Json<Vec<Affirmation>>> {
    Ok(Json(state.store.find_affirmations().await?))
}

pub async fn random_affirmation(State(state): State<AppState>) -> AppResult<Json<Affirmation>> {
    let mut rng = StdRng::from_entropy();
    let affirmation = content::random_affirmation(state.store.as_ref(), &mut rng).await?;
    Ok(Json(affirmation))
}
