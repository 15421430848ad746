//! The signed-in user's notification inbox.

use taskdeck_core::types::Id;
use taskdeck_db::models::notification::Notification;
use taskdeck_db::repositories::notification_repo::DEFAULT_LIMIT;
use taskdeck_db::repositories::NotificationRepo;
use taskdeck_remote::RemoteError;

use crate::collection::SyncedCollection;
use crate::context::AppContext;
use crate::error::SyncError;

pub struct NotificationInbox {
    ctx: AppContext,
    notifications: SyncedCollection<Notification>,
}

impl NotificationInbox {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            notifications: SyncedCollection::new("notification"),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.snapshot()
    }

    /// Unread count of the loaded page. Use [`refresh_unread_count`] for the
    /// server's count.
    ///
    /// [`refresh_unread_count`]: Self::refresh_unread_count
    pub fn unread_count(&self) -> usize {
        self.notifications.ids_where(|n| !n.read).len()
    }

    pub async fn load(&self, unread_only: bool) -> Result<usize, SyncError> {
        let result = async {
            let user_id = self.ctx.current_user().await?;
            let rows =
                NotificationRepo::list_for_user(&self.ctx.client, user_id, unread_only, DEFAULT_LIMIT)
                    .await?;
            Ok::<_, SyncError>(rows)
        }
        .await;
        let notifications = self.ctx.reported("Could not load notifications", result)?;
        let count = notifications.len();
        self.notifications.replace_all(notifications);
        Ok(count)
    }

    pub async fn refresh_unread_count(&self) -> Result<usize, SyncError> {
        let user_id = self.ctx.current_user().await?;
        Ok(NotificationRepo::unread_count(&self.ctx.client, user_id).await?)
    }

    pub async fn mark_read(&self, id: Id) -> Result<Notification, SyncError> {
        let result = self
            .notifications
            .update(id, |n| n.read = true, async {
                NotificationRepo::mark_read(&self.ctx.client, id)
                    .await
                    .map(|_| None)
            })
            .await;
        self.ctx.reported("Could not update notification", result)
    }

    /// Mark every loaded unread notification read with one remote call.
    /// Returns how many local entries changed.
    pub async fn mark_all_read(&self) -> Result<usize, SyncError> {
        let result = async {
            let user_id = self.ctx.current_user().await?;
            self.notifications
                .update_where(
                    |n| !n.read,
                    |n| n.read = true,
                    async {
                        let changed = NotificationRepo::mark_all_read(&self.ctx.client, user_id).await?;
                        tracing::debug!(%user_id, changed, "Notifications marked read");
                        Ok::<_, RemoteError>(())
                    },
                )
                .await
        }
        .await;
        let touched = self.ctx.reported("Could not update notifications", result)?;
        Ok(touched.len())
    }

    pub async fn delete(&self, id: Id) -> Result<(), SyncError> {
        let result = self
            .notifications
            .remove(id, NotificationRepo::delete(&self.ctx.client, id))
            .await;
        self.ctx.reported("Could not delete notification", result)
    }
}
