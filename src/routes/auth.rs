use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tower_sessions::Session;

use crate::auth::{login_user, logout_user, AuthUser};
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, User};
use crate::response::{ApiJson, ApiResponse};
use crate::routes::users::fetch_user_by_username;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid username or password".to_string())
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<ApiResponse<User>> {
    let (username, password) = input.credentials()?;
    tracing::debug!(%username, "login attempt");

    let db = state.db.connect().await?;
    let user = fetch_user_by_username(db, &username)
        .await?
        .ok_or_else(invalid_credentials)?;

    // Plaintext comparison, as stored.
    if user.password != password {
        tracing::debug!(%username, "password mismatch");
        return Err(invalid_credentials());
    }

    login_user(&session, &user).await?;
    tracing::info!(user_id = %user.id, "logged in");
    Ok(ApiResponse::ok(user))
}

async fn logout(session: Session) -> AppResult<ApiResponse<&'static str>> {
    logout_user(&session).await?;
    Ok(ApiResponse::ok("Logged out"))
}

async fn me(AuthUser(user): AuthUser) -> ApiResponse<User> {
    ApiResponse::ok(user)
}
