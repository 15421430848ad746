//! Project and system permission matrices.
//!
//! Project permissions are a fixed matrix over [`Role`]. System
//! permissions (the admin console) are data: the backend stores which
//! system role grants which [`SystemPermission`], and [`PermissionMatrix`]
//! answers lookups over the loaded rows.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CoreError;
use crate::roles::Role;
use crate::status::define_text_enum;

/// Actions gated per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectAction {
    ViewProject,
    EditProject,
    DeleteProject,
    ManageTeam,
    EditTasks,
    ViewFinancials,
    ManageFinancials,
    ManageRisks,
}

/// Returns `true` if `role` may perform `action` on a project.
pub fn role_allows(role: Role, action: ProjectAction) -> bool {
    use ProjectAction::*;
    match role {
        Role::Admin | Role::Owner => true,
        Role::ProjectManager => action != DeleteProject,
        Role::TeamMember | Role::Developer | Role::Designer | Role::Tester => {
            matches!(action, ViewProject | EditTasks)
        }
        Role::Viewer => action == ViewProject,
    }
}

/// Resolve the role a user effectively holds on a project.
///
/// System admins outrank ownership, and ownership outranks whatever
/// membership row exists. `None` means the user has no access at all.
pub fn effective_role(
    is_system_admin: bool,
    is_owner: bool,
    member_role: Option<Role>,
) -> Option<Role> {
    if is_system_admin {
        Some(Role::Admin)
    } else if is_owner {
        Some(Role::Owner)
    } else {
        member_role
    }
}

/// Check an action for an effective role, producing a `Forbidden` error.
pub fn ensure_allowed(role: Option<Role>, action: ProjectAction) -> Result<(), CoreError> {
    match role {
        Some(r) if role_allows(r, action) => Ok(()),
        Some(r) => Err(CoreError::Forbidden(format!(
            "Role '{r}' may not perform {action:?}"
        ))),
        None => Err(CoreError::Forbidden(
            "No access to this project".to_string(),
        )),
    }
}

define_text_enum! {
    /// Permissions grantable to a system role in the admin console.
    SystemPermission {
        ManageUsers = "manage_users",
        ManageRoles = "manage_roles",
        ManageProjects = "manage_projects",
        ViewReports = "view_reports",
        ManageSettings = "manage_settings",
        ViewAuditLog = "view_audit_log",
    }
}

/// System role name to granted permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMatrix {
    grants: BTreeMap<String, BTreeSet<SystemPermission>>,
}

impl PermissionMatrix {
    /// Build a matrix from `(role name, permission)` pairs.
    ///
    /// Roles listed in `roles` appear even when they grant nothing.
    pub fn from_grants<'a>(
        roles: impl IntoIterator<Item = &'a str>,
        grants: impl IntoIterator<Item = (&'a str, SystemPermission)>,
    ) -> Self {
        let mut matrix = Self::default();
        for role in roles {
            matrix.grants.entry(role.to_string()).or_default();
        }
        for (role, permission) in grants {
            matrix
                .grants
                .entry(role.to_string())
                .or_default()
                .insert(permission);
        }
        matrix
    }

    /// Returns `true` if `role` grants `permission`.
    pub fn grants(&self, role: &str, permission: SystemPermission) -> bool {
        self.grants
            .get(role)
            .is_some_and(|set| set.contains(&permission))
    }

    /// Permissions granted by `role`, sorted.
    pub fn permissions_for(&self, role: &str) -> Vec<SystemPermission> {
        self.grants
            .get(role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Role names, sorted.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.grants.keys().map(String::as_str)
    }

    pub fn grant(&mut self, role: &str, permission: SystemPermission) -> bool {
        self.grants
            .entry(role.to_string())
            .or_default()
            .insert(permission)
    }

    pub fn revoke(&mut self, role: &str, permission: SystemPermission) -> bool {
        self.grants
            .get_mut(role)
            .is_some_and(|set| set.remove(&permission))
    }
}
