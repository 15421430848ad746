//! Project team roster.
//!
//! A project has at most one project manager: adding or promoting a member
//! to `project_manager` demotes every other manager to `team_member`.

use taskdeck_core::error::CoreError;
use taskdeck_core::permissions::{ensure_allowed, ProjectAction};
use taskdeck_core::roles::Role;
use taskdeck_core::types::Id;
use taskdeck_db::models::team_member::{AddMember, TeamMember, UNKNOWN_MEMBER_NAME};
use taskdeck_db::repositories::TeamRepo;
use taskdeck_remote::RemoteError;
use validator::Validate;

use crate::collection::SyncedCollection;
use crate::context::AppContext;
use crate::error::SyncError;

pub struct TeamRoster {
    ctx: AppContext,
    project_id: Id,
    /// Caller's effective role; `None` leaves gating to the backend.
    actor_role: Option<Role>,
    members: SyncedCollection<TeamMember>,
}

impl TeamRoster {
    pub fn new(ctx: AppContext, project_id: Id) -> Self {
        Self {
            ctx,
            project_id,
            actor_role: None,
            members: SyncedCollection::new("team member"),
        }
    }

    /// Gate mutations on the caller's role before any optimistic step.
    pub fn with_actor_role(mut self, role: Role) -> Self {
        self.actor_role = Some(role);
        self
    }

    pub fn members(&self) -> Vec<TeamMember> {
        self.members.snapshot()
    }

    pub fn collection(&self) -> &SyncedCollection<TeamMember> {
        &self.members
    }

    pub fn project_managers(&self) -> Vec<TeamMember> {
        self.members
            .snapshot()
            .into_iter()
            .filter(|m| m.role == Role::ProjectManager)
            .collect()
    }

    /// Fetch the roster through the member fallback chain. Never fails.
    pub async fn load(&self) -> usize {
        let members = TeamRepo::list_members(&self.ctx.client, self.project_id).await;
        let count = members.len();
        self.members.replace_all(members);
        tracing::debug!(project_id = %self.project_id, count, "Team roster loaded");
        count
    }

    /// Add a member from form input; `role` is free text.
    pub async fn add_member(
        &self,
        user_id: Id,
        name: &str,
        role: &str,
    ) -> Result<TeamMember, SyncError> {
        let result = self.try_add_member(user_id, name, role).await;
        self.ctx.reported("Could not add team member", result)
    }

    async fn try_add_member(
        &self,
        user_id: Id,
        name: &str,
        role: &str,
    ) -> Result<TeamMember, SyncError> {
        self.authorize()?;
        let input = AddMember::from_input(user_id, name, role);
        input.validate()?;
        if self.members.snapshot().iter().any(|m| m.user_id == user_id) {
            return Err(CoreError::Conflict(format!("{} is already on this project", input.name)).into());
        }

        let provisional = TeamMember {
            id: Id::new_v4(),
            project_id: self.project_id,
            user_id,
            name: input.name.clone(),
            role: input.role,
        };
        let member = self
            .members
            .add(provisional, async {
                let mut member = TeamRepo::add_member(&self.ctx.client, self.project_id, &input).await?;
                if member.name == UNKNOWN_MEMBER_NAME {
                    member.name = input.name.clone();
                }
                Ok::<_, RemoteError>(member)
            })
            .await?;

        if member.role == Role::ProjectManager {
            self.demote_other_managers(member.id).await;
        }
        self.ctx.emitter.success(
            "Team member added",
            format!("{} joined as {}", member.name, member.role.label()),
        );
        Ok(member)
    }

    pub async fn remove_member(&self, member_id: Id) -> Result<(), SyncError> {
        let result = self.try_remove_member(member_id).await;
        self.ctx.reported("Could not remove team member", result)
    }

    async fn try_remove_member(&self, member_id: Id) -> Result<(), SyncError> {
        self.authorize()?;
        let member = self.member(member_id)?;
        self.members
            .remove(
                member_id,
                TeamRepo::remove_member(&self.ctx.client, self.project_id, member.user_id),
            )
            .await?;
        self.ctx
            .emitter
            .success("Team member removed", format!("{} left the project", member.name));
        Ok(())
    }

    /// Change a member's role, enforcing the single-manager rule.
    pub async fn change_role(&self, member_id: Id, role: Role) -> Result<TeamMember, SyncError> {
        let result = async {
            self.authorize()?;
            let member = self.set_role(member_id, role).await?;
            if role == Role::ProjectManager {
                self.demote_other_managers(member_id).await;
            }
            Ok::<_, SyncError>(member)
        }
        .await;
        self.ctx.reported("Could not change role", result)
    }

    fn authorize(&self) -> Result<(), SyncError> {
        match self.actor_role {
            Some(role) => Ok(ensure_allowed(Some(role), ProjectAction::ManageTeam)?),
            None => Ok(()),
        }
    }

    fn member(&self, member_id: Id) -> Result<TeamMember, SyncError> {
        self.members.get(member_id).ok_or_else(|| {
            CoreError::NotFound {
                entity: "team member",
                id: member_id,
            }
            .into()
        })
    }

    async fn set_role(&self, member_id: Id, role: Role) -> Result<TeamMember, SyncError> {
        let member = self.member(member_id)?;
        self.members
            .update(member_id, |m| m.role = role, async {
                TeamRepo::update_role(&self.ctx.client, self.project_id, member.user_id, role)
                    .await
                    .map(|_| None)
            })
            .await
    }

    /// Demote every manager except `keep`. Failures are reported but do not
    /// undo the promotion.
    async fn demote_other_managers(&self, keep: Id) {
        let others = self
            .members
            .ids_where(|m| m.role == Role::ProjectManager && m.id != keep);
        for id in others {
            if let Err(e) = self.set_role(id, Role::TeamMember).await {
                tracing::warn!(member_id = %id, error = %e, "Failed to demote project manager");
                self.ctx.report_failure("Could not demote previous project manager", &e);
            }
        }
    }
}
