//! Project membership records.
//!
//! Member rows arrive in two shapes: the member RPCs return a flat row with
//! `full_name`, while the direct table read embeds `profiles(full_name)`.
//! Both decode into [`TeamMember`], and the role is canonicalized on the way
//! in.

use serde::{Deserialize, Serialize};
use taskdeck_core::roles::Role;
use taskdeck_core::types::Id;
use validator::Validate;

use super::Record;

/// Select list for the direct `project_members` read.
pub const MEMBER_COLUMNS: &str = "id, project_id, user_id, role, profiles(full_name)";

/// Display name used when neither row shape carries one.
pub const UNKNOWN_MEMBER_NAME: &str = "Unknown member";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MemberRow")]
pub struct TeamMember {
    pub id: Id,
    pub project_id: Id,
    pub user_id: Id,
    pub name: String,
    pub role: Role,
}

impl Record for TeamMember {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Deserialize)]
struct MemberRow {
    id: Id,
    project_id: Id,
    user_id: Id,
    #[serde(alias = "full_name")]
    name: Option<String>,
    role: Role,
    profiles: Option<ProfileName>,
}

#[derive(Deserialize)]
struct ProfileName {
    full_name: Option<String>,
}

impl From<MemberRow> for TeamMember {
    fn from(row: MemberRow) -> Self {
        let name = row
            .name
            .or_else(|| row.profiles.and_then(|p| p.full_name))
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_MEMBER_NAME.to_string());
        Self {
            id: row.id,
            project_id: row.project_id,
            user_id: row.user_id,
            name,
            role: row.role,
        }
    }
}

/// DTO for adding a member to a project.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct AddMember {
    pub user_id: Id,
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub name: String,
    pub role: Role,
}

impl AddMember {
    /// Build from form input; the role text is canonicalized.
    pub fn from_input(user_id: Id, name: &str, role: &str) -> Self {
        Self {
            user_id,
            name: name.trim().to_string(),
            role: Role::normalize(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rpc_shape_with_free_text_role() {
        let member: TeamMember = serde_json::from_value(json!({
            "id": Id::new_v4(),
            "project_id": Id::new_v4(),
            "user_id": Id::new_v4(),
            "full_name": "Jane Doe",
            "role": "Project Manager"
        }))
        .unwrap();
        assert_eq!(member.name, "Jane Doe");
        assert_eq!(member.role, Role::ProjectManager);
    }

    #[test]
    fn table_shape_with_embedded_profile() {
        let member: TeamMember = serde_json::from_value(json!({
            "id": Id::new_v4(),
            "project_id": Id::new_v4(),
            "user_id": Id::new_v4(),
            "role": "dev",
            "profiles": {"full_name": "Sam Lee"}
        }))
        .unwrap();
        assert_eq!(member.name, "Sam Lee");
        assert_eq!(member.role, Role::Developer);
    }

    #[test]
    fn missing_name_and_unknown_role_fall_back() {
        let member: TeamMember = serde_json::from_value(json!({
            "id": Id::new_v4(),
            "project_id": Id::new_v4(),
            "user_id": Id::new_v4(),
            "role": "wizard",
            "profiles": null
        }))
        .unwrap();
        assert_eq!(member.name, UNKNOWN_MEMBER_NAME);
        assert_eq!(member.role, Role::TeamMember);
    }

    #[test]
    fn add_member_canonicalizes_input() {
        let dto = AddMember::from_input(Id::new_v4(), " Jane Doe ", "Project Manager");
        assert_eq!(dto.name, "Jane Doe");
        assert_eq!(dto.role, Role::ProjectManager);
        assert_eq!(serde_json::to_value(&dto).unwrap()["role"], "project_manager");
    }
}
