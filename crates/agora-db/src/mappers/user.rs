//! UserProfile <-> model mapper

use agora_core::entities::{UserProfile, UserRole};
use agora_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for UserProfile {
    fn from(model: UserModel) -> Self {
        UserProfile {
            id: Snowflake::new(model.id),
            username: model.username,
            display_name: model.display_name,
            // Unknown roles get no extra capabilities
            role: model.role.parse().unwrap_or(UserRole::Member),
        }
    }
}
