//! Milestones, risks and financial records of one project.

use chrono::Utc;
use taskdeck_core::permissions::ensure_allowed;
use taskdeck_core::roles::Role;
use taskdeck_core::types::Id;
use taskdeck_db::models::project_item::ProjectItem;
use taskdeck_db::repositories::ProjectItemRepo;
use validator::Validate;

use crate::collection::SyncedCollection;
use crate::context::AppContext;
use crate::error::SyncError;

pub struct ProjectItems<T> {
    ctx: AppContext,
    project_id: Id,
    actor_role: Option<Role>,
    items: SyncedCollection<T>,
}

impl<T: ProjectItem> ProjectItems<T> {
    pub fn new(ctx: AppContext, project_id: Id) -> Self {
        Self {
            ctx,
            project_id,
            actor_role: None,
            items: SyncedCollection::new(T::SINGULAR),
        }
    }

    pub fn with_actor_role(mut self, role: Role) -> Self {
        self.actor_role = Some(role);
        self
    }

    pub fn items(&self) -> Vec<T> {
        self.items.snapshot()
    }

    pub fn collection(&self) -> &SyncedCollection<T> {
        &self.items
    }

    fn authorize(&self) -> Result<(), SyncError> {
        match self.actor_role {
            Some(role) => Ok(ensure_allowed(Some(role), T::MANAGE_ACTION)?),
            None => Ok(()),
        }
    }

    /// Never fails; an exhausted chain leaves the list empty.
    pub async fn load(&self) -> usize {
        let items = ProjectItemRepo::list::<T>(&self.ctx.client, self.project_id).await;
        let count = items.len();
        self.items.replace_all(items);
        tracing::debug!(project_id = %self.project_id, kind = T::PLURAL, count, "Line items loaded");
        count
    }

    pub async fn add(&self, input: T::New) -> Result<T, SyncError> {
        let result = async {
            self.authorize()?;
            input.validate()?;
            let provisional = T::draft(self.project_id, &input, Utc::now());
            self.items
                .add(
                    provisional,
                    ProjectItemRepo::add::<T>(&self.ctx.client, self.project_id, &input),
                )
                .await
        }
        .await;
        let title = format!("Could not add {}", T::SINGULAR);
        let item = self.ctx.reported(&title, result)?;
        tracing::info!(project_id = %self.project_id, kind = T::SINGULAR, id = %item.id(), "Line item added");
        Ok(item)
    }

    pub async fn update(&self, id: Id, patch: T::Patch) -> Result<T, SyncError> {
        let result = async {
            self.authorize()?;
            patch.validate()?;
            self.items
                .update(id, |item| item.apply(&patch), async {
                    ProjectItemRepo::update::<T>(&self.ctx.client, id, &patch)
                        .await
                        .map(|_| None)
                })
                .await
        }
        .await;
        let title = format!("Could not update {}", T::SINGULAR);
        self.ctx.reported(&title, result)
    }

    pub async fn delete(&self, id: Id) -> Result<(), SyncError> {
        let result = async {
            self.authorize()?;
            self.items
                .remove(id, ProjectItemRepo::delete::<T>(&self.ctx.client, id))
                .await
        }
        .await;
        let title = format!("Could not delete {}", T::SINGULAR);
        self.ctx.reported(&title, result)
    }
}
