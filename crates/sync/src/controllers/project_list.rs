//! The signed-in user's projects.

use chrono::Utc;
use taskdeck_core::error::CoreError;
use taskdeck_core::roles::Role;
use taskdeck_core::status::ProjectStatus;
use taskdeck_core::types::Id;
use taskdeck_db::models::project::{CreateProject, ProjectRecord, UpdateProject};
use taskdeck_db::repositories::{AccessRepo, ProfileRepo, ProjectRepo};
use validator::Validate;

use crate::collection::SyncedCollection;
use crate::context::AppContext;
use crate::error::SyncError;

pub struct ProjectList {
    ctx: AppContext,
    projects: SyncedCollection<ProjectRecord>,
}

impl ProjectList {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            projects: SyncedCollection::new("project"),
        }
    }

    pub fn projects(&self) -> Vec<ProjectRecord> {
        self.projects.snapshot()
    }

    pub fn collection(&self) -> &SyncedCollection<ProjectRecord> {
        &self.projects
    }

    /// Fetch owned and member projects. An exhausted chain leaves the list
    /// empty rather than failing.
    pub async fn load(&self) -> Result<usize, SyncError> {
        let user_id = self.ctx.current_user().await?;
        let projects = ProjectRepo::list_for_user(&self.ctx.client, user_id).await;
        let count = projects.len();
        self.projects.replace_all(projects);
        tracing::debug!(%user_id, count, "Projects loaded");
        Ok(count)
    }

    /// The caller's effective role on a project.
    ///
    /// Access goes through the versioned access policy first; a denial is
    /// `Forbidden` and nothing else is fetched. Access granted without an
    /// owner or membership row is read-only.
    pub async fn access(&self, project_id: Id) -> Result<Role, SyncError> {
        let user_id = self.ctx.current_user().await?;
        let client = &self.ctx.client;
        if !AccessRepo::check_access(client, project_id, user_id).await {
            return Err(CoreError::Forbidden("No access to this project".to_string()).into());
        }

        let project = match self.projects.get(project_id) {
            Some(project) => project,
            None => ProjectRepo::find_by_id(client, project_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "project",
                    id: project_id,
                })?,
        };
        let is_system_admin = ProfileRepo::find_by_id(client, user_id)
            .await?
            .is_some_and(|profile| profile.is_system_admin());
        let role = AccessRepo::project_role(client, &project, user_id, is_system_admin)
            .await?
            .unwrap_or(Role::Viewer);
        tracing::debug!(%project_id, %role, "Project role resolved");
        Ok(role)
    }

    /// Create a project. It starts `not-started` at 0 percent.
    pub async fn create(&self, input: CreateProject) -> Result<ProjectRecord, SyncError> {
        let result = async {
            input.validate()?;
            let owner = self.ctx.current_user().await?;
            let provisional = ProjectRecord {
                id: Id::new_v4(),
                name: input.name.trim().to_string(),
                description: input
                    .description
                    .clone()
                    .filter(|d| !d.trim().is_empty()),
                progress: 0,
                status: ProjectStatus::NotStarted,
                due_date: input.due_date,
                user_id: owner,
                created_at: Utc::now(),
                updated_at: None,
            };
            self.projects
                .add(provisional, ProjectRepo::create(&self.ctx.client, owner, &input))
                .await
        }
        .await;

        let project = self.ctx.reported("Could not create project", result)?;
        tracing::info!(project_id = %project.id, name = %project.name, "Project created");
        self.ctx
            .emitter
            .success("Project created", format!("\"{}\" is ready", project.name));
        Ok(project)
    }

    pub async fn update_settings(
        &self,
        id: Id,
        patch: UpdateProject,
    ) -> Result<ProjectRecord, SyncError> {
        let result = async {
            patch.validate()?;
            self.projects
                .update(id, |p| p.apply(&patch), async {
                    ProjectRepo::update(&self.ctx.client, id, &patch).await.map(Some)
                })
                .await
        }
        .await;

        let project = self.ctx.reported("Could not save project settings", result)?;
        self.ctx.emitter.success("Project updated", "Settings saved");
        Ok(project)
    }

    pub async fn delete(&self, id: Id) -> Result<(), SyncError> {
        let name = self.projects.get(id).map(|p| p.name);
        let result = self
            .projects
            .remove(id, ProjectRepo::delete(&self.ctx.client, id))
            .await;
        self.ctx.reported("Could not delete project", result)?;
        tracing::info!(project_id = %id, "Project deleted");
        self.ctx.emitter.success(
            "Project deleted",
            format!("\"{}\" was removed", name.unwrap_or_default()),
        );
        Ok(())
    }
}
