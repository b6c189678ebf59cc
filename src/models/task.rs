use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{check_title, double_option, present};
use crate::error::AppError;
use crate::timestamp;

pub const TITLE_MAX_LEN: usize = 200;
pub const NOTES_MAX_LEN: usize = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Priority {
    #[serde(rename = "low")]
    #[sqlx(rename = "low")]
    Low,
    #[default]
    #[serde(rename = "medium")]
    #[sqlx(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    #[sqlx(rename = "high")]
    High,
}

impl Priority {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(AppError::BadRequest(format!(
                "`{other}` is not a valid priority"
            ))),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
}

fn check_notes(notes: &str) -> Result<String, AppError> {
    let notes = notes.trim();
    if notes.chars().count() > NOTES_MAX_LEN {
        return Err(AppError::BadRequest(format!(
            "Notes cannot exceed {NOTES_MAX_LEN} characters"
        )));
    }
    Ok(notes.to_string())
}

fn check_due_date(due_date: Option<String>) -> Result<Option<String>, AppError> {
    present(due_date)
        .map(|d| timestamp::parse("dueDate", &d))
        .transpose()
}

impl NewTask {
    pub fn into_task(self) -> Result<Task, AppError> {
        let (Some(user_id), Some(title)) = (present(self.user_id), present(self.title)) else {
            return Err(AppError::BadRequest(
                "userId and title are required".to_string(),
            ));
        };

        let priority = match present(self.priority) {
            Some(p) => Priority::parse(&p)?,
            None => Priority::default(),
        };
        let now = timestamp::now();

        Ok(Task {
            id: Uuid::new_v4().to_string(),
            user_id,
            title: check_title(&title, TITLE_MAX_LEN)?,
            notes: check_notes(self.notes.as_deref().unwrap_or_default())?,
            due_date: check_due_date(self.due_date)?,
            priority,
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

impl Task {
    /// Merge a patch into this record, validating the result.
    pub fn apply(&mut self, patch: TaskPatch) -> Result<(), AppError> {
        if let Some(title) = patch.title {
            self.title = check_title(&title, TITLE_MAX_LEN)?;
        }
        if let Some(notes) = patch.notes {
            self.notes = check_notes(&notes)?;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = check_due_date(due_date)?;
        }
        if let Some(priority) = patch.priority {
            self.priority = Priority::parse(&priority)?;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = timestamp::now();
        Ok(())
    }
}
