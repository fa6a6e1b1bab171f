use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod models;
mod services;
mod store;

use config::Config;
use store::{MemoryStore, PgStore, Store, TimeoutStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wellness_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);
    let store = open_store(&config).await?;

    if config.seed_on_startup {
        // A failed seed leaves the service usable with whatever content exists.
        match services::seed::seed_reference_content(store.as_ref(), Utc::now()).await {
            Ok(inserted) => tracing::info!(inserted, "Reference content seeding finished"),
            Err(e) => tracing::error!(error = %e, "Reference content seeding failed"),
        }
    }

    let state = AppState {
        store,
        config: config.clone(),
    };
    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    let limit = config.store_timeout();

    match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url, config.database_max_connections)
                .await
                .context("failed to connect to database")?;
            let pg = PgStore::new(pool);
            pg.migrate().await.context("failed to run database migrations")?;
            tracing::info!("Database migrations applied");
            Ok(with_timeout(pg, limit))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Ok(with_timeout(MemoryStore::new(), limit))
        }
    }
}

fn with_timeout<S: Store + 'static>(inner: S, limit: Duration) -> Arc<dyn Store> {
    Arc::new(TimeoutStore::new(inner, limit))
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Users
        .route("/api/users", post(handlers::users::create_user))
        .route(
            "/api/users/:id",
            get(handlers::users::get_user).put(handlers::users::update_user),
        )
        // Mood
        .route("/api/mood", post(handlers::mood::log_mood))
        .route("/api/mood/user/:user_id", get(handlers::mood::mood_history))
        // Goals
        .route("/api/goals", post(handlers::goals::create_goal))
        .route("/api/goals/user/:user_id", get(handlers::goals::list_goals))
        .route(
            "/api/goals/:id",
            put(handlers::goals::update_goal).delete(handlers::goals::delete_goal),
        )
        // Messages
        .route("/api/messages", post(handlers::messages::save_messages))
        .route(
            "/api/messages/user/:user_id",
            get(handlers::messages::list_messages),
        )
        // Settings
        .route("/api/settings", post(handlers::settings::save_settings))
        .route(
            "/api/settings/user/:user_id",
            get(handlers::settings::get_settings),
        )
        // Reference content
        .route("/api/meditations", get(handlers::content::list_meditations))
        .route(
            "/api/meditations/type/:meditation_type",
            get(handlers::content::meditations_by_type),
        )
        .route("/api/tips", get(handlers::content::list_tips))
        .route(
            "/api/tips/category/:category",
            get(handlers::content::tips_by_category),
        )
        .route("/api/affirmations", get(handlers::content::list_affirmations))
        .route(
            "/api/affirmations/random",
            get(handlers::content::random_affirmation),
        );

    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(allowed)
}
