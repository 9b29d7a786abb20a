use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod llm;
mod models;

use config::Config;
use llm::engines::Engines;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub engines: Engines,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        // Accounts
        .route("/register", post(handlers::users::register))
        .route("/login", post(handlers::users::login))
        // Journal
        .route(
            "/mood",
            post(handlers::journal::create_mood_entry).get(handlers::journal::list_mood),
        )
        .route("/activity", post(handlers::journal::create_activity))
        .route(
            "/assessment/questions/:assessment_type",
            get(handlers::assessments::assessment_questions),
        )
        .route(
            "/assessment/:assessment_type",
            post(handlers::assessments::submit_assessment),
        )
        // Chat
        .route("/chat", post(handlers::chat::chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let mut origins = Vec::new();
    match config.frontend_url.parse::<axum::http::HeaderValue>() {
        Ok(hv) => origins.push(hv),
        Err(e) => tracing::warn!(error = %e, url = %config.frontend_url, "Ignoring invalid FRONTEND_URL"),
    }
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindmate_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();

    let db = db::create_pool(&config.database_url)?;
    // Non-fatal: an unreachable database is logged and the server still starts.
    db::schema::init_schema(&db, &config.database_name).await;

    let engines = Engines::from_config(&config);
    tracing::info!(backend = ?engines.backend, "Chat engines configured");

    let state = AppState { db, engines };
    let app = build_router(state).layer(cors_layer(&config));

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// State with a lazily-connecting pool; no database is contacted unless a
/// handler queries it.
#[cfg(test)]
pub(crate) fn test_state(engines: Engines) -> AppState {
    let db = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://mindmate@127.0.0.1:1/mindmate")
        .expect("lazy pool");
    AppState { db, engines }
}
