use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{check_title, present};
use crate::error::AppError;
use crate::timestamp;

pub const TITLE_MAX_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Mood {
    #[serde(rename = "happy")]
    #[sqlx(rename = "happy")]
    Happy,
    #[serde(rename = "good")]
    #[sqlx(rename = "good")]
    Good,
    #[serde(rename = "okay")]
    #[sqlx(rename = "okay")]
    Okay,
    #[serde(rename = "sad")]
    #[sqlx(rename = "sad")]
    Sad,
    #[serde(rename = "anxious")]
    #[sqlx(rename = "anxious")]
    Anxious,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Good, Mood::Okay, Mood::Sad, Mood::Anxious];

    pub fn parse(value: &str) -> Result<Self, AppError> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == value)
            .ok_or_else(|| AppError::BadRequest(format!("`{value}` is not a valid mood")))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Good => "Good",
            Mood::Okay => "Okay",
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😄",
            Mood::Good => "😊",
            Mood::Okay => "😐",
            Mood::Sad => "😔",
            Mood::Anxious => "😰",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the mood picker.
#[derive(Debug, Clone, Serialize)]
pub struct MoodOption {
    pub value: Mood,
    pub label: &'static str,
    pub emoji: &'static str,
}

impl From<Mood> for MoodOption {
    fn from(mood: Mood) -> Self {
        Self {
            value: mood,
            label: mood.label(),
            emoji: mood.emoji(),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub date: String,
    /// Kept in `entry_tags`, loaded separately.
    #[sqlx(skip)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub date: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub date: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl NewEntry {
    pub fn into_entry(self) -> Result<Entry, AppError> {
        let (Some(user_id), Some(title), Some(content), Some(mood)) = (
            present(self.user_id),
            present(self.title),
            present(self.content),
            present(self.mood),
        ) else {
            return Err(AppError::BadRequest("Missing required fields".to_string()));
        };

        let title = check_title(&title, TITLE_MAX_LEN)?;
        let mood = Mood::parse(&mood)?;
        let now = timestamp::now();
        let date = match present(self.date) {
            Some(date) => timestamp::parse("date", &date)?,
            None => now.clone(),
        };

        Ok(Entry {
            id: Uuid::new_v4().to_string(),
            user_id,
            title,
            content,
            mood,
            date,
            tags: clean_tags(self.tags.unwrap_or_default()),
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

impl Entry {
    /// Merge a patch into this record, validating the result.
    pub fn apply(&mut self, patch: EntryPatch) -> Result<(), AppError> {
        if let Some(title) = patch.title {
            self.title = check_title(&title, TITLE_MAX_LEN)?;
        }
        if let Some(content) = patch.content {
            if content.trim().is_empty() {
                return Err(AppError::BadRequest("Content is required".to_string()));
            }
            self.content = content;
        }
        if let Some(mood) = patch.mood {
            self.mood = Mood::parse(&mood)?;
        }
        if let Some(date) = patch.date {
            self.date = timestamp::parse("date", &date)?;
        }
        if let Some(tags) = patch.tags {
            self.tags = clean_tags(tags);
        }
        self.updated_at = timestamp::now();
        Ok(())
    }
}
