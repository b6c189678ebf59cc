pub mod user;
pub mod entry;
pub mod task;

pub use user::{LoginRequest, NewUser, ThemeMode, ThemePreference, User, UserPatch, UserSummary};
pub use entry::{Entry, EntryPatch, Mood, MoodOption, NewEntry};
pub use task::{NewTask, Priority, Task, TaskPatch};

use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Required string that must not be blank once trimmed.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn check_title(title: &str, max: usize) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if title.chars().count() > max {
        return Err(AppError::BadRequest(format!(
            "Title cannot exceed {max} characters"
        )));
    }
    Ok(title.to_string())
}
