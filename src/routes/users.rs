use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use sqlx::SqlitePool;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{NewUser, User, UserPatch, UserSummary};
use crate::response::{ApiJson, ApiResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", get(get_user).patch(update_user))
}

pub(crate) async fn fetch_user(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub(crate) async fn fetch_user_by_username(
    db: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

fn username_taken(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict("Username already taken".to_string())
    } else {
        AppError::Database(e)
    }
}

async fn list_users(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let db = state.db.connect().await?;
    let users: Vec<UserSummary> = sqlx::query_as(
        "SELECT id, username, email, created_at FROM users ORDER BY created_at ASC, username ASC",
    )
    .fetch_all(db)
    .await?;

    Ok(ApiResponse::ok(users))
}

async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> AppResult<ApiResponse<User>> {
    let user = input.into_user()?;
    let db = state.db.connect().await?;

    // Uniqueness is left to the UNIQUE index so concurrent signups cannot race.
    sqlx::query(
        r#"
        INSERT INTO users (id, username, password, email, theme_mode, accent_color, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.password)
    .bind(&user.email)
    .bind(user.theme_preference.mode)
    .bind(&user.theme_preference.accent_color)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(db)
    .await
    .map_err(username_taken)?;

    tracing::info!(user_id = %user.id, username = %user.username, "user created");
    Ok(ApiResponse::created(user))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<User>> {
    let db = state.db.connect().await?;
    let user = fetch_user(db, &id).await?.ok_or_else(user_not_found)?;
    Ok(ApiResponse::ok(user))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> AppResult<ApiResponse<User>> {
    let db = state.db.connect().await?;
    let mut user = fetch_user(db, &id).await?.ok_or_else(user_not_found)?;
    user.apply(patch)?;

    let result = sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, theme_mode = ?, accent_color = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(user.theme_preference.mode)
    .bind(&user.theme_preference.accent_color)
    .bind(&user.updated_at)
    .bind(&id)
    .execute(db)
    .await
    .map_err(username_taken)?;

    if result.rows_affected() == 0 {
        return Err(user_not_found());
    }

    Ok(ApiResponse::ok(user))
}
