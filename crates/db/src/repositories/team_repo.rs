//! Repository for project membership.
//!
//! Membership is reachable three ways with different privilege
//! requirements, so every operation is a [`FallbackChain`]: the
//! security-definer RPC first, then the older RPC, then the table itself.

use serde_json::json;
use taskdeck_core::roles::Role;
use taskdeck_core::types::Id;
use taskdeck_remote::{FallbackChain, Operation, RemoteClient, RemoteError};

use crate::models::team_member::{AddMember, TeamMember, MEMBER_COLUMNS};
use crate::repositories::Added;

const TABLE: &str = "project_members";

pub struct TeamRepo;

impl TeamRepo {
    /// Members of a project. Never fails: an exhausted chain is an empty
    /// roster.
    pub async fn list_members(client: &RemoteClient, project_id: Id) -> Vec<TeamMember> {
        let args = json!({ "p_project_id": project_id });
        let legacy_args = args.clone();

        FallbackChain::<Vec<TeamMember>>::new("project members")
            .then("rpc_members_safe", move || async move {
                client
                    .rows(&Operation::rpc("get_project_members_safe", args))
                    .await
            })
            .then("rpc_members", move || async move {
                client
                    .rows(&Operation::rpc("get_project_members", legacy_args))
                    .await
            })
            .then("direct", move || async move {
                client
                    .rows(
                        &Operation::select(TABLE)
                            .columns(MEMBER_COLUMNS)
                            .eq("project_id", project_id)
                            .order_asc("created_at"),
                    )
                    .await
            })
            .resolve_or_default()
            .await
    }

    /// Add a member, returning the stored row. A successful RPC is final:
    /// an id or void reply is read back, never inserted again.
    pub async fn add_member(
        client: &RemoteClient,
        project_id: Id,
        input: &AddMember,
    ) -> Result<TeamMember, RemoteError> {
        let resolved = FallbackChain::<Added<TeamMember>>::new("add project member")
            .then("rpc_add_member", move || async move {
                let rpc = Operation::rpc(
                    "add_project_member",
                    json!({
                        "p_project_id": project_id,
                        "p_user_id": input.user_id,
                        "p_role": input.role,
                    }),
                );
                let reply = client.call(&rpc).await?;
                Added::decode(&rpc.label(), reply)
            })
            .then("direct", move || async move {
                client
                    .one(
                        &Operation::insert(
                            TABLE,
                            json!({
                                "project_id": project_id,
                                "user_id": input.user_id,
                                "role": input.role,
                            }),
                        )
                        .columns(MEMBER_COLUMNS),
                    )
                    .await
                    .map(Added::Row)
            })
            .resolve()
            .await?;

        let read_back = Operation::select(TABLE).columns(MEMBER_COLUMNS);
        let read_back = match resolved.value {
            Added::Row(member) => return Ok(member),
            Added::Id(id) => read_back.eq("id", id),
            // Older deployments return void.
            Added::Nothing => read_back
                .eq("project_id", project_id)
                .eq("user_id", input.user_id),
        };
        let rows: Vec<TeamMember> = client.rows(&read_back.limit(1)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::not_found("add_project_member returned no row"))
    }

    pub async fn remove_member(
        client: &RemoteClient,
        project_id: Id,
        user_id: Id,
    ) -> Result<(), RemoteError> {
        FallbackChain::<()>::new("remove project member")
            .then("rpc_remove_member", move || async move {
                client
                    .exec(&Operation::rpc(
                        "remove_project_member",
                        json!({ "p_project_id": project_id, "p_user_id": user_id }),
                    ))
                    .await
            })
            .then("direct", move || async move {
                client
                    .exec(
                        &Operation::delete(TABLE)
                            .eq("project_id", project_id)
                            .eq("user_id", user_id),
                    )
                    .await
            })
            .resolve()
            .await
            .map(|_| ())
    }

    pub async fn update_role(
        client: &RemoteClient,
        project_id: Id,
        user_id: Id,
        role: Role,
    ) -> Result<(), RemoteError> {
        FallbackChain::<()>::new("assign project role")
            .then("rpc_assign_role", move || async move {
                client
                    .exec(&Operation::rpc(
                        "assign_project_role",
                        json!({
                            "p_project_id": project_id,
                            "p_user_id": user_id,
                            "p_role": role,
                        }),
                    ))
                    .await
            })
            .then("direct", move || async move {
                client
                    .exec(
                        &Operation::update(TABLE, json!({ "role": role }))
                            .eq("project_id", project_id)
                            .eq("user_id", user_id),
                    )
                    .await
            })
            .resolve()
            .await
            .map(|_| ())
    }
}
