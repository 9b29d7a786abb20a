use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::db::users::{create_user, find_user_by_email};
use crate::dto::{normalize_email, LoginRequest, RegisterRequest};
use crate::error::{AppError, AppResult};
use crate::models::user::UserProfile;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    body.validate()?;

    let email = normalize_email(&body.email);
    let pwd_hash = hash_password(&body.password)?;
    let user = create_user(&state.db, body.name.trim(), &email, &pwd_hash).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<UserProfile>> {
    let email = normalize_email(&body.email);
    let user = find_user_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    Ok(Json(user.into()))
}
