use taskdeck_core::types::Date;
use taskdeck_db::models::dashboard::DashboardSummary;
use taskdeck_db::repositories::{ProjectRepo, TaskRepo};

use crate::context::AppContext;
use crate::error::SyncError;

/// Read-only overview of the signed-in user's projects and tasks.
pub struct Dashboard {
    ctx: AppContext,
}

impl Dashboard {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Fetch projects and created tasks concurrently and summarize them
    /// relative to `today`.
    pub async fn summary(&self, today: Date) -> Result<DashboardSummary, SyncError> {
        let result = async {
            let user_id = self.ctx.current_user().await?;
            let (projects, tasks) = tokio::join!(
                ProjectRepo::list_for_user(&self.ctx.client, user_id),
                TaskRepo::list_created_by(&self.ctx.client, user_id),
            );
            let summary = DashboardSummary::compute(&projects, &tasks?, today);
            tracing::debug!(
                %user_id,
                projects = summary.total_projects,
                open_tasks = summary.open_tasks,
                "Dashboard summary computed"
            );
            Ok::<_, SyncError>(summary)
        }
        .await;
        self.ctx.reported("Could not load dashboard", result)
    }
}
