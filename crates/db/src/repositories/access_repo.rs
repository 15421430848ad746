//! Project access checks.
//!
//! The access check is one declared, versioned policy: newest RPC first,
//! oldest last, then a direct ownership/membership query. The first answer
//! that arrives is authoritative, including `false`.

use serde::Deserialize;
use serde_json::json;
use taskdeck_core::permissions::effective_role;
use taskdeck_core::roles::Role;
use taskdeck_core::types::Id;
use taskdeck_remote::{FallbackChain, Operation, RemoteClient, RemoteError};

use crate::models::project::ProjectRecord;

/// Access-check RPCs, newest first.
pub const ACCESS_POLICY: &[&str] = &[
    "check_project_access_v3",
    "check_project_access_v2",
    "check_project_access",
];

#[derive(Deserialize)]
struct RoleRow {
    role: Role,
}

pub struct AccessRepo;

impl AccessRepo {
    /// Whether `user_id` may open `project_id`. Exhaustion denies access.
    pub async fn check_access(client: &RemoteClient, project_id: Id, user_id: Id) -> bool {
        let mut chain = FallbackChain::<bool>::new("project access");
        for &function in ACCESS_POLICY {
            chain = chain.then(function, move || async move {
                client
                    .scalar(&Operation::rpc(
                        function,
                        json!({ "p_project_id": project_id, "p_user_id": user_id }),
                    ))
                    .await
            });
        }
        let chain = chain.then("direct", move || async move {
            Self::direct_access(client, project_id, user_id).await
        });

        match chain.resolve().await {
            Ok(resolved) => {
                tracing::debug!(
                    %project_id,
                    strategy = resolved.strategy,
                    allowed = resolved.value,
                    "Project access resolved"
                );
                resolved.value
            }
            Err(e) => {
                tracing::warn!(%project_id, error = %e, "Project access check failed, denying");
                false
            }
        }
    }

    /// The caller's membership role on a project, if any.
    pub async fn member_role(
        client: &RemoteClient,
        project_id: Id,
        user_id: Id,
    ) -> Result<Option<Role>, RemoteError> {
        let rows: Vec<RoleRow> = client
            .rows(
                &Operation::select("project_members")
                    .columns("role")
                    .eq("project_id", project_id)
                    .eq("user_id", user_id)
                    .limit(1),
            )
            .await?;
        Ok(rows.into_iter().next().map(|r| r.role))
    }

    /// The role `user_id` effectively holds on `project`.
    pub async fn project_role(
        client: &RemoteClient,
        project: &ProjectRecord,
        user_id: Id,
        is_system_admin: bool,
    ) -> Result<Option<Role>, RemoteError> {
        let is_owner = project.is_owned_by(user_id);
        let member_role = if is_system_admin || is_owner {
            None
        } else {
            Self::member_role(client, project.id, user_id).await?
        };
        Ok(effective_role(is_system_admin, is_owner, member_role))
    }

    async fn direct_access(
        client: &RemoteClient,
        project_id: Id,
        user_id: Id,
    ) -> Result<bool, RemoteError> {
        let owned: Vec<serde_json::Value> = client
            .rows(
                &Operation::select("projects")
                    .columns("id")
                    .eq("id", project_id)
                    .eq("user_id", user_id)
                    .limit(1),
            )
            .await?;
        if !owned.is_empty() {
            return Ok(true);
        }
        Ok(Self::member_role(client, project_id, user_id).await?.is_some())
    }
}
