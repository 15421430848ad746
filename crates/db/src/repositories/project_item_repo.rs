//! Generic repository for project line items (milestones, risks,
//! financial records).
//!
//! Every family is reached through `get_project_{plural}`,
//! `add_project_{singular}` and `update_project_{singular}` with a direct
//! table fallback. RPC arguments are `p_project_id` plus the DTO under
//! `p_data`; updates pass `p_id` and `p_updates`.

use serde_json::{json, Value};
use taskdeck_core::types::Id;
use taskdeck_remote::{FallbackChain, Operation, RemoteClient, RemoteError};

use crate::models::project_item::ProjectItem;
use crate::repositories::Added;

pub struct ProjectItemRepo;

impl ProjectItemRepo {
    /// Line items of a project, newest first. Never fails.
    pub async fn list<T: ProjectItem>(client: &RemoteClient, project_id: Id) -> Vec<T> {
        let rpc = format!("get_project_{}", T::PLURAL);
        FallbackChain::<Vec<T>>::new(T::PLURAL)
            .then("rpc", move || async move {
                client
                    .rows(&Operation::rpc(rpc, json!({ "p_project_id": project_id })))
                    .await
            })
            .then("direct", move || async move {
                client
                    .rows(
                        &Operation::select(T::TABLE)
                            .eq("project_id", project_id)
                            .order_desc("created_at"),
                    )
                    .await
            })
            .resolve_or_default()
            .await
    }

    /// Add a line item, returning the stored row.
    ///
    /// Once `add_project_{singular}` succeeds the row exists, so an id or
    /// empty reply is read back instead of inserting again. The direct
    /// insert runs only when the RPC itself fails.
    pub async fn add<T: ProjectItem>(
        client: &RemoteClient,
        project_id: Id,
        input: &T::New,
    ) -> Result<T, RemoteError> {
        let data = to_body(T::TABLE, input)?;
        let rpc = Operation::rpc(
            format!("add_project_{}", T::SINGULAR),
            json!({ "p_project_id": project_id, "p_data": data.clone() }),
        );
        let label = rpc.label();

        let mut row = data;
        if let Value::Object(fields) = &mut row {
            fields.insert("project_id".to_string(), json!(project_id));
        }

        let resolved = FallbackChain::<Added<T>>::new(T::SINGULAR)
            .then("rpc", move || async move {
                let reply = client.call(&rpc).await?;
                Added::decode(&rpc.label(), reply)
            })
            .then("direct", move || async move {
                client
                    .one(&Operation::insert(T::TABLE, row))
                    .await
                    .map(Added::Row)
            })
            .resolve()
            .await?;

        let read_back = match resolved.value {
            Added::Row(item) => return Ok(item),
            Added::Id(id) => Operation::select(T::TABLE).eq("id", id).limit(1),
            Added::Nothing => Operation::select(T::TABLE)
                .eq("project_id", project_id)
                .order_desc("created_at")
                .limit(1),
        };
        tracing::debug!(operation = %label, "Add returned no row, reading it back");
        let rows: Vec<T> = client.rows(&read_back).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::not_found(format!("{label} returned no row")))
    }

    /// Patch a line item. Success is reported without the row: the older
    /// RPCs return nothing.
    pub async fn update<T: ProjectItem>(
        client: &RemoteClient,
        id: Id,
        patch: &T::Patch,
    ) -> Result<(), RemoteError> {
        let updates = to_body(T::TABLE, patch)?;
        let rpc = format!("update_project_{}", T::SINGULAR);
        let rpc_args = json!({ "p_id": id, "p_updates": updates.clone() });

        FallbackChain::<()>::new(T::SINGULAR)
            .then("rpc", move || async move {
                client.exec(&Operation::rpc(rpc, rpc_args)).await
            })
            .then("direct", move || async move {
                client
                    .exec(&Operation::update(T::TABLE, updates).eq("id", id))
                    .await
            })
            .resolve()
            .await
            .map(|_| ())
    }

    pub async fn delete<T: ProjectItem>(client: &RemoteClient, id: Id) -> Result<(), RemoteError> {
        client.exec(&Operation::delete(T::TABLE).eq("id", id)).await
    }
}

fn to_body(table: &str, dto: &impl serde::Serialize) -> Result<Value, RemoteError> {
    serde_json::to_value(dto).map_err(|e| RemoteError::malformed(format!("insert:{table}"), e))
}
