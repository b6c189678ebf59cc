use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::{NewTask, Task, TaskPatch};
use crate::response::{ApiJson, ApiResponse};
use crate::routes::OwnerQuery;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
}

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".to_string())
}

async fn fetch_task(db: &SqlitePool, id: &str) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<ApiResponse<Vec<Task>>> {
    let user_id = query.require()?;
    let db = state.db.connect().await?;

    let tasks: Vec<Task> =
        sqlx::query_as("SELECT * FROM tasks WHERE user_id = ? ORDER BY created_at DESC, rowid DESC")
            .bind(&user_id)
            .fetch_all(db)
            .await?;
    tracing::debug!(%user_id, count = tasks.len(), "fetched tasks");

    Ok(ApiResponse::ok(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewTask>,
) -> AppResult<ApiResponse<Task>> {
    let task = input.into_task()?;
    let db = state.db.connect().await?;

    sqlx::query(
        r#"
        INSERT INTO tasks (id, user_id, title, notes, due_date, priority, completed, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&task.id)
    .bind(&task.user_id)
    .bind(&task.title)
    .bind(&task.notes)
    .bind(&task.due_date)
    .bind(task.priority)
    .bind(task.completed)
    .bind(&task.created_at)
    .bind(&task.updated_at)
    .execute(db)
    .await?;

    tracing::info!(task_id = %task.id, user_id = %task.user_id, "task created");
    Ok(ApiResponse::created(task))
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Task>> {
    let db = state.db.connect().await?;
    let task = fetch_task(db, &id).await?.ok_or_else(task_not_found)?;
    Ok(ApiResponse::ok(task))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> AppResult<ApiResponse<Task>> {
    let db = state.db.connect().await?;
    let mut task = fetch_task(db, &id).await?.ok_or_else(task_not_found)?;
    task.apply(patch)?;

    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET title = ?, notes = ?, due_date = ?, priority = ?, completed = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&task.title)
    .bind(&task.notes)
    .bind(&task.due_date)
    .bind(task.priority)
    .bind(task.completed)
    .bind(&task.updated_at)
    .bind(&id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(task_not_found());
    }

    Ok(ApiResponse::ok(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Task>> {
    let db = state.db.connect().await?;
    let task = fetch_task(db, &id).await?.ok_or_else(task_not_found)?;

    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(&id)
        .execute(db)
        .await?;

    tracing::info!(task_id = %id, "task deleted");
    Ok(ApiResponse::ok(task))
}
