use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::Entry;
use crate::routes::entries::fetch_entries_for_user;
use crate::routes::OwnerQuery;
use crate::{timestamp, AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportData {
    exported_at: String,
    entries: Vec<Entry>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/entries/export", get(export_entries))
}

async fn export_entries(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = query.require()?;
    let db = state.db.connect().await?;

    let export = ExportData {
        exported_at: timestamp::now(),
        entries: fetch_entries_for_user(db, &user_id, false).await?,
    };

    let filename = format!("moodlog-export-{}.json", chrono::Utc::now().format("%Y-%m-%d"));

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    tracing::info!(%user_id, count = export.entries.len(), "journal exported");
    Ok((headers, Json(export)))
}
