//! System administration: role permission matrix and user role assignment.
//!
//! Only system admins may load the console. Grants and revokes are applied
//! to the local matrix first and undone if the backend rejects them.

use std::sync::{Mutex, MutexGuard, PoisonError};

use taskdeck_core::error::CoreError;
use taskdeck_core::permissions::{PermissionMatrix, SystemPermission};
use taskdeck_core::types::Id;
use taskdeck_db::models::profile::Profile;
use taskdeck_db::models::system_role::SystemRole;
use taskdeck_db::repositories::{ProfileRepo, RoleRepo};

use crate::collection::SyncedCollection;
use crate::context::AppContext;
use crate::error::SyncError;

pub struct AdminConsole {
    ctx: AppContext,
    roles: Mutex<Vec<SystemRole>>,
    matrix: Mutex<PermissionMatrix>,
    profiles: SyncedCollection<Profile>,
}

impl AdminConsole {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            roles: Mutex::new(Vec::new()),
            matrix: Mutex::new(PermissionMatrix::default()),
            profiles: SyncedCollection::new("profile"),
        }
    }

    fn matrix_lock(&self) -> MutexGuard<'_, PermissionMatrix> {
        self.matrix.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn roles(&self) -> Vec<SystemRole> {
        self.roles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn matrix(&self) -> PermissionMatrix {
        self.matrix_lock().clone()
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles.snapshot()
    }

    /// Load roles, grants and users. Fails with `Forbidden` unless the
    /// signed-in user is a system admin.
    pub async fn load(&self) -> Result<(), SyncError> {
        let result = async {
            let user_id = self.ctx.current_user().await?;
            let own = ProfileRepo::find_by_id(&self.ctx.client, user_id).await?;
            if !own.as_ref().is_some_and(Profile::is_system_admin) {
                tracing::warn!(%user_id, "Admin console denied");
                return Err(CoreError::Forbidden("System administrators only".to_string()).into());
            }

            let (roles, matrix) = RoleRepo::load_matrix(&self.ctx.client).await?;
            let profiles = ProfileRepo::list(&self.ctx.client).await?;
            tracing::debug!(roles = roles.len(), users = profiles.len(), "Admin console loaded");

            *self.roles.lock().unwrap_or_else(PoisonError::into_inner) = roles;
            *self.matrix_lock() = matrix;
            self.profiles.replace_all(profiles);
            Ok::<_, SyncError>(())
        }
        .await;
        self.ctx.reported("Could not load admin console", result)
    }

    fn role_id(&self, role: &str) -> Result<Id, SyncError> {
        self.roles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.name == role)
            .map(|r| r.id)
            .ok_or_else(|| CoreError::Validation(format!("unknown system role '{role}'")).into())
    }

    /// Grant `permission` to `role`. Granting an already granted permission
    /// is a no-op.
    pub async fn grant(&self, role: &str, permission: SystemPermission) -> Result<(), SyncError> {
        let result = async {
            let role_id = self.role_id(role)?;
            if !self.matrix_lock().grant(role, permission) {
                return Ok(());
            }
            if let Err(e) = RoleRepo::grant(&self.ctx.client, role_id, permission).await {
                self.matrix_lock().revoke(role, permission);
                return Err(e.into());
            }
            tracing::info!(role, permission = %permission, "Permission granted");
            Ok::<_, SyncError>(())
        }
        .await;
        self.ctx.reported("Could not grant permission", result)
    }

    pub async fn revoke(&self, role: &str, permission: SystemPermission) -> Result<(), SyncError> {
        let result = async {
            let role_id = self.role_id(role)?;
            if !self.matrix_lock().revoke(role, permission) {
                return Ok(());
            }
            if let Err(e) = RoleRepo::revoke(&self.ctx.client, role_id, permission).await {
                self.matrix_lock().grant(role, permission);
                return Err(e.into());
            }
            tracing::info!(role, permission = %permission, "Permission revoked");
            Ok::<_, SyncError>(())
        }
        .await;
        self.ctx.reported("Could not revoke permission", result)
    }

    /// Assign a system role to a user; `None` clears it.
    pub async fn assign_system_role(
        &self,
        user_id: Id,
        role: Option<&str>,
    ) -> Result<Profile, SyncError> {
        let result = async {
            if let Some(name) = role {
                self.role_id(name)?;
            }
            self.profiles
                .update(user_id, |p| p.role = role.map(str::to_string), async {
                    ProfileRepo::set_system_role(&self.ctx.client, user_id, role)
                        .await
                        .map(Some)
                })
                .await
        }
        .await;
        let profile = self.ctx.reported("Could not assign role", result)?;
        self.ctx.emitter.success(
            "Role updated",
            format!(
                "{} is now {}",
                profile.display_name(),
                profile.role.as_deref().unwrap_or("without a system role")
            ),
        );
        Ok(profile)
    }
}
