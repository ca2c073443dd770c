//! Profile database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for profiles table
#[derive(Debug, Clone, FromRow)]
pub struct ProfileModel {
    pub id: i64,
    pub display_name: String,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileModel {
    /// Check if the profile has an uploaded avatar
    #[inline]
    pub fn has_avatar(&self) -> bool {
        self.avatar_path.is_some()
    }
}
