//! Profile entity <-> model mapper

use campus_core::entities::Profile;
use campus_core::value_objects::Snowflake;

use crate::models::ProfileModel;

/// Convert ProfileModel to Profile entity
impl From<ProfileModel> for Profile {
    fn from(model: ProfileModel) -> Self {
        Profile {
            id: Snowflake::new(model.id),
            display_name: model.display_name,
            department: model.department,
            bio: model.bio,
            skills: model.skills,
            avatar_path: model.avatar_path,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
