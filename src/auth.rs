use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::User;
use crate::routes::users::fetch_user;
use crate::AppState;

const USER_ID_KEY: &str = "user_id";

/// The user behind the request's session cookie.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| not_logged_in())?;

        let user_id: Option<String> = session.get(USER_ID_KEY).await?;
        let Some(user_id) = user_id else {
            return Err(not_logged_in());
        };

        let pool = state.db.connect().await?;
        fetch_user(pool, &user_id)
            .await?
            .map(AuthUser)
            .ok_or_else(not_logged_in)
    }
}

fn not_logged_in() -> AppError {
    AppError::Unauthorized("Not logged in".to_string())
}

pub async fn login_user(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, &user.id).await
}

pub async fn logout_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
