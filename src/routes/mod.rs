pub mod auth;
pub mod entries;
pub mod export;
pub mod tasks;
pub mod users;

use serde::Deserialize;

/// `?userId=` filter shared by the per-owner listings.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl OwnerQuery {
    pub fn require(self) -> Result<String, crate::error::AppError> {
        self.user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| crate::error::AppError::BadRequest("User ID required".to_string()))
    }
}
