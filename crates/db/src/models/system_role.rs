//! Admin console records: system roles and their permission grants.

use serde::{Deserialize, Serialize};
use taskdeck_core::permissions::{PermissionMatrix, SystemPermission};
use taskdeck_core::types::Id;

use super::Record;

/// A row from the `system_roles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRole {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
}

impl Record for SystemRole {
    fn id(&self) -> Id {
        self.id
    }
}

/// A row from the `system_role_permissions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRolePermission {
    pub id: Id,
    pub role_id: Id,
    pub permission: SystemPermission,
}

/// Join grant rows to role names. Grants for unknown role ids are dropped.
pub fn build_matrix(roles: &[SystemRole], grants: &[SystemRolePermission]) -> PermissionMatrix {
    let named = grants.iter().filter_map(|g| {
        roles
            .iter()
            .find(|r| r.id == g.role_id)
            .map(|r| (r.name.as_str(), g.permission))
    });
    PermissionMatrix::from_grants(roles.iter().map(|r| r.name.as_str()), named)
}
