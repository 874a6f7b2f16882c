use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{normalize_email, password, AuthError, AuthUser};
use crate::errors::AppError;
use crate::models::user::{User, UserRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub user: User,
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email)?;
    password::check_strength(&req.password)?;

    if find_by_email(&state, &email).await?.is_some() {
        return Err(AuthError::EmailTaken.into());
    }

    let password_hash = password::hash_password(&req.password)?;
    let row: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, email, password_hash, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&state.db)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::from(AuthError::EmailTaken)
        }
        other => AppError::Database(other),
    })?;

    let user = User::from(&row);
    let token = state.tokens.issue(&user, Utc::now())?;
    info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&req.email).map_err(|_| AuthError::InvalidCredentials)?;
    let row = find_by_email(&state, &email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !password::verify_password(&req.password, &row.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let user = User::from(&row);
    let token = state.tokens.issue(&user, Utc::now())?;
    Ok(Json(AuthResponse { token, user }))
}

/// GET /api/v1/auth/verify
/// A valid token is not enough: the account must still exist.
pub async fn handle_verify(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<VerifyResponse>, AppError> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
    )
    .bind(auth.id.0)
    .fetch_optional(&state.db)
    .await?;

    let row = row.ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(VerifyResponse {
        user: User::from(&row),
    }))
}

async fn find_by_email(state: &AppState, email: &str) -> Result<Option<UserRow>, AppError> {
    let row = sqlx::query_as(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(&state.db)
    .await?;
    Ok(row)
}
