//! Repository for `system_roles` and `system_role_permissions`.

use serde_json::json;
use taskdeck_core::permissions::{PermissionMatrix, SystemPermission};
use taskdeck_core::types::Id;
use taskdeck_remote::{Operation, RemoteClient, RemoteError};

use crate::models::system_role::{build_matrix, SystemRole, SystemRolePermission};

const ROLES: &str = "system_roles";
const GRANTS: &str = "system_role_permissions";

pub struct RoleRepo;

impl RoleRepo {
    pub async fn list_roles(client: &RemoteClient) -> Result<Vec<SystemRole>, RemoteError> {
        client
            .rows(&Operation::select(ROLES).order_asc("name"))
            .await
    }

    pub async fn list_grants(
        client: &RemoteClient,
    ) -> Result<Vec<SystemRolePermission>, RemoteError> {
        client.rows(&Operation::select(GRANTS)).await
    }

    /// Roles and the matrix built from their grants.
    pub async fn load_matrix(
        client: &RemoteClient,
    ) -> Result<(Vec<SystemRole>, PermissionMatrix), RemoteError> {
        let roles = Self::list_roles(client).await?;
        let grants = Self::list_grants(client).await?;
        let matrix = build_matrix(&roles, &grants);
        Ok((roles, matrix))
    }

    pub async fn grant(
        client: &RemoteClient,
        role_id: Id,
        permission: SystemPermission,
    ) -> Result<(), RemoteError> {
        client
            .exec(&Operation::insert(
                GRANTS,
                json!({ "role_id": role_id, "permission": permission }),
            ))
            .await
    }

    pub async fn revoke(
        client: &RemoteClient,
        role_id: Id,
        permission: SystemPermission,
    ) -> Result<(), RemoteError> {
        client
            .exec(
                &Operation::delete(GRANTS)
                    .eq("role_id", role_id)
                    .eq("permission", permission),
            )
            .await
    }
}
