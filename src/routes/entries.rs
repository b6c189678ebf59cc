use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::{Entry, EntryPatch, Mood, MoodOption, NewEntry};
use crate::response::{ApiJson, ApiResponse};
use crate::routes::OwnerQuery;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/moods", get(list_moods))
        .route("/api/entries", get(list_entries).post(create_entry))
        .route(
            "/api/entries/{id}",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
}

fn entry_not_found() -> AppError {
    AppError::NotFound("Entry not found".to_string())
}

/// All entries of one owner ordered by `date`, tags attached.
pub(crate) async fn fetch_entries_for_user(
    db: &SqlitePool,
    user_id: &str,
    newest_first: bool,
) -> Result<Vec<Entry>, sqlx::Error> {
    let order = if newest_first {
        "date DESC, created_at DESC"
    } else {
        "date ASC, created_at ASC"
    };
    let mut entries: Vec<Entry> = sqlx::query_as(&format!(
        "SELECT * FROM entries WHERE user_id = ? ORDER BY {order}"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT et.entry_id, et.name
        FROM entry_tags et
        JOIN entries e ON e.id = et.entry_id
        WHERE e.user_id = ?
        ORDER BY et.entry_id, et.position
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let mut tags: HashMap<String, Vec<String>> = HashMap::new();
    for (entry_id, name) in rows {
        tags.entry(entry_id).or_default().push(name);
    }
    for entry in &mut entries {
        entry.tags = tags.remove(&entry.id).unwrap_or_default();
    }

    Ok(entries)
}

async fn fetch_entry(db: &SqlitePool, id: &str) -> Result<Option<Entry>, sqlx::Error> {
    let entry: Option<Entry> = sqlx::query_as("SELECT * FROM entries WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;

    let Some(mut entry) = entry else {
        return Ok(None);
    };

    let tags: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM entry_tags WHERE entry_id = ? ORDER BY position")
            .bind(id)
            .fetch_all(db)
            .await?;
    entry.tags = tags.into_iter().map(|(name,)| name).collect();

    Ok(Some(entry))
}

async fn replace_tags(
    conn: &mut SqliteConnection,
    entry_id: &str,
    tags: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM entry_tags WHERE entry_id = ?")
        .bind(entry_id)
        .execute(&mut *conn)
        .await?;

    for (position, name) in tags.iter().enumerate() {
        sqlx::query("INSERT INTO entry_tags (entry_id, position, name) VALUES (?, ?, ?)")
            .bind(entry_id)
            .bind(position as i64)
            .bind(name)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

async fn list_moods() -> ApiResponse<Vec<MoodOption>> {
    ApiResponse::ok(Mood::ALL.into_iter().map(MoodOption::from).collect())
}

async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<ApiResponse<Vec<Entry>>> {
    let user_id = query.require()?;
    let db = state.db.connect().await?;

    let entries = fetch_entries_for_user(db, &user_id, true).await?;
    tracing::debug!(%user_id, count = entries.len(), "fetched entries");

    Ok(ApiResponse::ok(entries))
}

async fn create_entry(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewEntry>,
) -> AppResult<ApiResponse<Entry>> {
    let entry = input.into_entry()?;
    let db = state.db.connect().await?;

    let mut tx = db.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO entries (id, user_id, title, content, mood, date, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.user_id)
    .bind(&entry.title)
    .bind(&entry.content)
    .bind(entry.mood)
    .bind(&entry.date)
    .bind(&entry.created_at)
    .bind(&entry.updated_at)
    .execute(&mut *tx)
    .await?;
    replace_tags(&mut *tx, &entry.id, &entry.tags).await?;
    tx.commit().await?;

    tracing::info!(entry_id = %entry.id, user_id = %entry.user_id, "entry created");
    Ok(ApiResponse::created(entry))
}

async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Entry>> {
    let db = state.db.connect().await?;
    let entry = fetch_entry(db, &id).await?.ok_or_else(entry_not_found)?;
    Ok(ApiResponse::ok(entry))
}

async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<EntryPatch>,
) -> AppResult<ApiResponse<Entry>> {
    let db = state.db.connect().await?;
    let mut entry = fetch_entry(db, &id).await?.ok_or_else(entry_not_found)?;
    entry.apply(patch)?;

    let mut tx = db.begin().await?;
    let result = sqlx::query(
        r#"
        UPDATE entries
        SET title = ?, content = ?, mood = ?, date = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&entry.title)
    .bind(&entry.content)
    .bind(entry.mood)
    .bind(&entry.date)
    .bind(&entry.updated_at)
    .bind(&id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(entry_not_found());
    }

    replace_tags(&mut *tx, &id, &entry.tags).await?;
    tx.commit().await?;

    Ok(ApiResponse::ok(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Entry>> {
    let db = state.db.connect().await?;
    let entry = fetch_entry(db, &id).await?.ok_or_else(entry_not_found)?;

    // entry_tags rows go with it (ON DELETE CASCADE)
    let result = sqlx::query("DELETE FROM entries WHERE id = ?")
        .bind(&id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(entry_not_found());
    }

    tracing::info!(entry_id = %id, "entry deleted");
    Ok(ApiResponse::ok(entry))
}
