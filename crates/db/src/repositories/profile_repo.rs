//! Repository for the `profiles` table.

use serde_json::json;
use taskdeck_core::types::Id;
use taskdeck_remote::{Operation, RemoteClient, RemoteError};

use crate::models::profile::{Profile, UpdateProfile};

const TABLE: &str = "profiles";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_by_id(client: &RemoteClient, id: Id) -> Result<Option<Profile>, RemoteError> {
        let rows = client
            .rows(&Operation::select(TABLE).eq("id", id).limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// All profiles, alphabetical by name.
    pub async fn list(client: &RemoteClient) -> Result<Vec<Profile>, RemoteError> {
        client
            .rows(&Operation::select(TABLE).order_asc("full_name"))
            .await
    }

    pub async fn update(
        client: &RemoteClient,
        id: Id,
        input: &UpdateProfile,
    ) -> Result<Profile, RemoteError> {
        let patch = serde_json::to_value(input)
            .map_err(|e| RemoteError::malformed("update:profiles", e))?;
        client.one(&Operation::update(TABLE, patch).eq("id", id)).await
    }

    /// Assign a system role by name; `None` clears it.
    pub async fn set_system_role(
        client: &RemoteClient,
        user_id: Id,
        role: Option<&str>,
    ) -> Result<Profile, RemoteError> {
        client
            .one(&Operation::update(TABLE, json!({ "role": role })).eq("id", user_id))
            .await
    }
}
