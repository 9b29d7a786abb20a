use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "mindmate-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Database must answer; the local model server is reported but optional
/// because cloud engines can stand in for it.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();
    let local_llm_ok = state.engines.local.check_status().await;

    let checks = json!({
        "database": if db_ok { "ok" } else { "failed" },
        "local_llm": if local_llm_ok { "ok" } else { "unreachable" },
    });

    if db_ok {
        (StatusCode::OK, Json(json!({ "status": "ready", "checks": checks })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "checks": checks })),
        )
    }
}
