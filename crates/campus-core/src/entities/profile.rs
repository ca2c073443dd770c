//! Profile entity - a campus user as chat sees them

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// User profile
///
/// Identity itself comes from the upstream identity provider; this record
/// carries what chat needs to render a person (name, avatar) plus the
/// directory fields the rest of the app edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: Snowflake,
    pub display_name: String,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(id: Snowflake, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name,
            department: None,
            bio: None,
            skills: Vec::new(),
            avatar_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn has_avatar(&self) -> bool {
        self.avatar_path.is_some()
    }

    /// Update the display name
    pub fn set_display_name(&mut self, display_name: String) {
        self.display_name = display_name;
        self.updated_at = Utc::now();
    }

    /// Update the avatar storage path
    pub fn set_avatar_path(&mut self, avatar_path: Option<String>) {
        self.avatar_path = avatar_path;
        self.updated_at = Utc::now();
    }
}
