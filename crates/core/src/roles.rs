//! Project role canonicalization.
//!
//! Role values arrive as free text ("Project Manager", "pm", "QA ",
//! "team-member"). [`Role::normalize`] is the single place they are mapped
//! onto the closed [`Role`] enum, and `Role` deserializes through it so the
//! mapping happens once, at the ingestion boundary.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Runs of whitespace, hyphens, underscores and dots collapse to one `_`.
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-_.]+").expect("valid regex"));

/// Canonical project role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Owner,
    ProjectManager,
    TeamMember,
    Developer,
    Designer,
    Tester,
    Viewer,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::Admin,
        Role::Owner,
        Role::ProjectManager,
        Role::TeamMember,
        Role::Developer,
        Role::Designer,
        Role::Tester,
        Role::Viewer,
    ];

    /// Map free-text role input onto a canonical role.
    ///
    /// Unrecognized text maps to [`Role::TeamMember`]. The mapping is
    /// idempotent: normalizing [`Role::as_str`] yields the same role.
    pub fn normalize(raw: &str) -> Role {
        let lowered = raw.trim().to_lowercase();
        let key = SEPARATOR_RE.replace_all(&lowered, "_");
        match key.trim_matches('_') {
            "admin" | "administrator" | "system_admin" | "super_admin" => Role::Admin,
            "owner" | "project_owner" => Role::Owner,
            "project_manager" | "projectmanager" | "pm" | "manager" | "project_lead" => {
                Role::ProjectManager
            }
            "developer" | "dev" | "engineer" | "software_engineer" | "programmer" => {
                Role::Developer
            }
            "designer" | "design" | "ui_designer" | "ux_designer" | "ui_ux_designer" => {
                Role::Designer
            }
            "tester" | "qa" | "qa_engineer" | "quality_assurance" => Role::Tester,
            "viewer" | "read_only" | "readonly" | "guest" | "observer" => Role::Viewer,
            _ => Role::TeamMember,
        }
    }

    /// The canonical string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::ProjectManager => "project_manager",
            Role::TeamMember => "team_member",
            Role::Developer => "developer",
            Role::Designer => "designer",
            Role::Tester => "tester",
            Role::Viewer => "viewer",
        }
    }

    /// Human-readable label for toasts and member lists.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Owner => "Owner",
            Role::ProjectManager => "Project Manager",
            Role::TeamMember => "Team Member",
            Role::Developer => "Developer",
            Role::Designer => "Designer",
            Role::Tester => "Tester",
            Role::Viewer => "Viewer",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::TeamMember
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        Role::normalize(raw)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Role::normalize).unwrap_or_default())
    }
}
