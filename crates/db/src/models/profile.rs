//! User profile record.

use serde::{Deserialize, Serialize};
use taskdeck_core::types::Id;
use validator::Validate;

use super::Record;

/// A row from the `profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Id,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    /// Name of the assigned system role, if any.
    pub role: Option<String>,
}

impl Record for Profile {
    fn id(&self) -> Id {
        self.id
    }
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Unnamed user")
    }

    pub fn is_system_admin(&self) -> bool {
        self.role.as_deref().is_some_and(|r| r.eq_ignore_ascii_case("admin"))
    }
}

/// DTO for editing one's own profile.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "must be a valid URL"))]
    pub avatar_url: Option<String>,
}
