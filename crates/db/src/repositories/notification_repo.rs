//! Repository for the `notifications` table.

use serde_json::json;
use taskdeck_core::types::Id;
use taskdeck_remote::{Operation, RemoteClient, RemoteError};

use crate::models::notification::{NewNotification, Notification};

const TABLE: &str = "notifications";

/// Default page size for the inbox.
pub const DEFAULT_LIMIT: usize = 50;

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(
        client: &RemoteClient,
        input: &NewNotification,
    ) -> Result<Notification, RemoteError> {
        let body = serde_json::to_value(input)
            .map_err(|e| RemoteError::malformed("insert:notifications", e))?;
        client.one(&Operation::insert(TABLE, body)).await
    }

    /// Notifications for a user, newest first.
    ///
    /// When `unread_only` is `true`, only notifications with `read = false`
    /// are returned.
    pub async fn list_for_user(
        client: &RemoteClient,
        user_id: Id,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<Notification>, RemoteError> {
        let mut op = Operation::select(TABLE).eq("user_id", user_id);
        if unread_only {
            op = op.eq("read", false);
        }
        client
            .rows(&op.order_desc("created_at").limit(limit))
            .await
    }

    pub async fn unread_count(client: &RemoteClient, user_id: Id) -> Result<usize, RemoteError> {
        let rows: Vec<serde_json::Value> = client
            .rows(
                &Operation::select(TABLE)
                    .columns("id")
                    .eq("user_id", user_id)
                    .eq("read", false),
            )
            .await?;
        Ok(rows.len())
    }

    pub async fn mark_read(client: &RemoteClient, id: Id) -> Result<(), RemoteError> {
        client
            .exec(&Operation::update(TABLE, json!({ "read": true })).eq("id", id))
            .await
    }

    /// Mark every unread notification of a user as read, returning how many
    /// rows changed.
    pub async fn mark_all_read(client: &RemoteClient, user_id: Id) -> Result<usize, RemoteError> {
        let rows: Vec<serde_json::Value> = client
            .rows(
                &Operation::update(TABLE, json!({ "read": true }))
                    .eq("user_id", user_id)
                    .eq("read", false)
                    .columns("id"),
            )
            .await?;
        Ok(rows.len())
    }

    pub async fn delete(client: &RemoteClient, id: Id) -> Result<(), RemoteError> {
        client.exec(&Operation::delete(TABLE).eq("id", id)).await
    }
}
