use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::db::journal::{insert_activity, insert_mood_entry, list_mood_entries};
use crate::db::users::require_user_by_email;
use crate::dto::{normalize_email, ActivityRequest, MoodQuery, MoodRequest};
use crate::error::AppResult;
use crate::models::activity_log::ActivityLog;
use crate::models::mood_entry::MoodEntry;
use crate::AppState;

pub async fn create_mood_entry(
    State(state): State<AppState>,
    Json(body): Json<MoodRequest>,
) -> AppResult<(StatusCode, Json<MoodEntry>)> {
    body.validate()?;

    let user = require_user_by_email(&state.db, &normalize_email(&body.email)).await?;
    let entry = insert_mood_entry(
        &state.db,
        user.id,
        body.mood.trim(),
        body.note(),
        body.entry_date,
    )
    .await?;

    tracing::debug!(user_id = %user.id, mood = %entry.mood, "Mood logged");
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_mood(
    State(state): State<AppState>,
    Query(query): Query<MoodQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let user = require_user_by_email(&state.db, &normalize_email(&query.email)).await?;
    let entries = list_mood_entries(&state.db, user.id).await?;
    Ok(Json(entries))
}

pub async fn create_activity(
    State(state): State<AppState>,
    Json(body): Json<ActivityRequest>,
) -> AppResult<(StatusCode, Json<ActivityLog>)> {
    body.validate()?;

    let user = require_user_by_email(&state.db, &normalize_email(&body.email)).await?;
    let log = insert_activity(&state.db, user.id, body.activity.trim()).await?;

    Ok((StatusCode::CREATED, Json(log)))
}
