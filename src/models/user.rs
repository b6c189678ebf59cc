use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::double_option;
use crate::error::AppError;
use crate::timestamp;

pub const USERNAME_MIN_LEN: usize = 3;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const DEFAULT_ACCENT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum ThemeMode {
    #[default]
    #[serde(rename = "light")]
    #[sqlx(rename = "light")]
    Light,
    #[serde(rename = "dark")]
    #[sqlx(rename = "dark")]
    Dark,
}

impl ThemeMode {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(AppError::BadRequest(format!(
                "`{other}` is not a valid theme mode"
            ))),
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeMode::Light => write!(f, "light"),
            ThemeMode::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ThemePreference {
    #[sqlx(rename = "theme_mode")]
    pub mode: ThemeMode,
    pub accent_color: String,
}

impl Default for ThemePreference {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Light,
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
        }
    }
}

/// A stored user. The password never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[sqlx(flatten)]
    pub theme_preference: ThemePreference,
    pub created_at: String,
    pub updated_at: String,
}

/// Listing projection: identity and contact only.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    pub mode: Option<String>,
    pub accent_color: Option<String>,
}

/// Fields a client may change on its own profile. Unknown keys are ignored,
/// `password` is refused.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    pub theme_preference: Option<ThemePatch>,
    pub password: Option<serde_json::Value>,
}

fn check_username(username: &str) -> Result<String, AppError> {
    let username = username.trim();
    if username.chars().count() < USERNAME_MIN_LEN {
        return Err(AppError::BadRequest(format!(
            "Username must be at least {USERNAME_MIN_LEN} characters"
        )));
    }
    Ok(username.to_string())
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

impl NewUser {
    pub fn into_user(self) -> Result<User, AppError> {
        let username = check_username(self.username.as_deref().unwrap_or_default())?;

        let password = self.password.unwrap_or_default();
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }

        let now = timestamp::now();
        Ok(User {
            id: Uuid::new_v4().to_string(),
            username,
            password,
            email: normalize_email(self.email),
            theme_preference: ThemePreference::default(),
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

impl LoginRequest {
    /// Returns the trimmed username and the password as typed.
    pub fn credentials(self) -> Result<(String, String), AppError> {
        let username = self.username.map(|u| u.trim().to_string()).unwrap_or_default();
        let password = self.password.unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }
        Ok((username, password))
    }
}

impl User {
    /// Merge a patch into this record, validating the result.
    pub fn apply(&mut self, patch: UserPatch) -> Result<(), AppError> {
        if patch.password.is_some() {
            return Err(AppError::BadRequest(
                "Password cannot be changed through this endpoint".to_string(),
            ));
        }
        if let Some(username) = patch.username {
            self.username = check_username(&username)?;
        }
        if let Some(email) = patch.email {
            self.email = normalize_email(email);
        }
        if let Some(theme) = patch.theme_preference {
            if let Some(mode) = theme.mode {
                self.theme_preference.mode = ThemeMode::parse(&mode)?;
            }
            if let Some(accent) = theme.accent_color {
                self.theme_preference.accent_color = accent;
            }
        }
        self.updated_at = timestamp::now();
        Ok(())
    }
}
