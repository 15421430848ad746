//! Task board for a project, or for the tasks a user created.

use chrono::Utc;
use taskdeck_core::error::CoreError;
use taskdeck_core::status::{NotificationSeverity, TaskStatus};
use taskdeck_core::types::Id;
use taskdeck_db::models::task::{
    Assignee, CreateSubtask, CreateTask, Subtask, TaskRecord, UpdateTask,
};
use taskdeck_db::repositories::{SubtaskRepo, TaskRepo};
use taskdeck_events::PersistTarget;
use validator::Validate;

use crate::collection::SyncedCollection;
use crate::context::AppContext;
use crate::error::SyncError;

/// Which tasks a board shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    Project(Id),
    CreatedBy(Id),
}

pub struct TaskBoard {
    ctx: AppContext,
    scope: TaskScope,
    tasks: SyncedCollection<TaskRecord>,
    /// Subtasks of the task opened with [`TaskBoard::load_subtasks`].
    subtasks: SyncedCollection<Subtask>,
}

impl TaskBoard {
    pub fn new(ctx: AppContext, scope: TaskScope) -> Self {
        Self {
            ctx,
            scope,
            tasks: SyncedCollection::new("task"),
            subtasks: SyncedCollection::new("subtask"),
        }
    }

    pub fn scope(&self) -> TaskScope {
        self.scope
    }

    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.tasks.snapshot()
    }

    pub fn tasks_with_status(&self, status: TaskStatus) -> Vec<TaskRecord> {
        self.tasks
            .snapshot()
            .into_iter()
            .filter(|t| t.status == status)
            .collect()
    }

    pub fn collection(&self) -> &SyncedCollection<TaskRecord> {
        &self.tasks
    }

    pub fn subtasks(&self) -> Vec<Subtask> {
        self.subtasks.snapshot()
    }

    pub async fn load(&self) -> Result<usize, SyncError> {
        let result = match self.scope {
            TaskScope::Project(id) => TaskRepo::list_for_project(&self.ctx.client, id).await,
            TaskScope::CreatedBy(id) => TaskRepo::list_created_by(&self.ctx.client, id).await,
        };
        let tasks = self.ctx.reported("Could not load tasks", result.map_err(SyncError::from))?;
        let count = tasks.len();
        self.tasks.replace_all(tasks);
        tracing::debug!(scope = ?self.scope, count, "Tasks loaded");
        Ok(count)
    }

    pub async fn create(&self, mut input: CreateTask) -> Result<TaskRecord, SyncError> {
        if let TaskScope::Project(project_id) = self.scope {
            input.project_id = Some(project_id);
        }
        let result = async {
            input.validate()?;
            let creator = self.ctx.current_user().await?;
            let provisional = TaskRecord {
                id: Id::new_v4(),
                title: input.title.trim().to_string(),
                description: input.description.clone(),
                status: input.status,
                priority: input.priority,
                due_date: input.due_date,
                completed: input.status == TaskStatus::Completed,
                completed_at: None,
                project_id: input.project_id,
                user_id: creator,
                created_at: Utc::now(),
                assignees: Vec::new(),
            };
            self.tasks
                .add(provisional, TaskRepo::create(&self.ctx.client, creator, &input))
                .await
        }
        .await;

        let task = self.ctx.reported("Could not create task", result)?;
        tracing::info!(task_id = %task.id, title = %task.title, "Task created");
        self.ctx
            .emitter
            .success("Task created", format!("\"{}\" was added", task.title));
        Ok(task)
    }

    pub async fn edit(&self, id: Id, patch: UpdateTask) -> Result<TaskRecord, SyncError> {
        let result = async {
            patch.validate()?;
            self.tasks
                .update(id, |t| t.apply(&patch), async {
                    TaskRepo::update(&self.ctx.client, id, &patch).await.map(Some)
                })
                .await
        }
        .await;
        self.ctx.reported("Could not update task", result)
    }

    /// Flip a task's completion. Completing a task also stores a
    /// "Task completed" notification for the signed-in user.
    pub async fn toggle_completion(&self, id: Id) -> Result<TaskRecord, SyncError> {
        let result = async {
            let current = self.tasks.get(id).ok_or(CoreError::NotFound {
                entity: "task",
                id,
            })?;
            let patch = UpdateTask::toggle(&current, Utc::now());
            self.tasks
                .update(id, |t| t.apply(&patch), async {
                    TaskRepo::update(&self.ctx.client, id, &patch).await.map(Some)
                })
                .await
        }
        .await;
        let task = self.ctx.reported("Could not update task", result)?;

        if task.is_done() {
            tracing::info!(task_id = %task.id, "Task completed");
            let persist = self
                .ctx
                .session
                .user_id()
                .await
                .map(|user| PersistTarget::user(user).related("task", task.id));
            self.ctx
                .emitter
                .emit(
                    NotificationSeverity::Success,
                    "Task completed",
                    format!("\"{}\" was marked as completed", task.title),
                    persist,
                )
                .await;
        }
        Ok(task)
    }

    pub async fn delete(&self, id: Id) -> Result<(), SyncError> {
        let result = self
            .tasks
            .remove(id, TaskRepo::delete(&self.ctx.client, id))
            .await;
        self.ctx.reported("Could not delete task", result)?;
        tracing::info!(task_id = %id, "Task deleted");
        Ok(())
    }

    pub async fn assign(
        &self,
        task_id: Id,
        user_id: Id,
        name: Option<String>,
    ) -> Result<TaskRecord, SyncError> {
        let result = self
            .tasks
            .update(
                task_id,
                |t| {
                    if !t.is_assigned_to(user_id) {
                        t.assignees.push(Assignee { user_id, name });
                    }
                },
                async {
                    TaskRepo::assign(&self.ctx.client, task_id, user_id)
                        .await
                        .map(|_| None)
                },
            )
            .await;
        self.ctx.reported("Could not assign task", result)
    }

    pub async fn unassign(&self, task_id: Id, user_id: Id) -> Result<TaskRecord, SyncError> {
        let result = self
            .tasks
            .update(
                task_id,
                |t| t.assignees.retain(|a| a.user_id != user_id),
                async {
                    TaskRepo::unassign(&self.ctx.client, task_id, user_id)
                        .await
                        .map(|_| None)
                },
            )
            .await;
        self.ctx.reported("Could not unassign task", result)
    }

    // ---- subtasks ----

    pub async fn load_subtasks(&self, task_id: Id) -> Result<usize, SyncError> {
        let result = SubtaskRepo::list_for_task(&self.ctx.client, task_id)
            .await
            .map_err(SyncError::from);
        let subtasks = self.ctx.reported("Could not load subtasks", result)?;
        let count = subtasks.len();
        self.subtasks.replace_all(subtasks);
        Ok(count)
    }

    pub async fn add_subtask(&self, task_id: Id, title: &str) -> Result<Subtask, SyncError> {
        let input = CreateSubtask {
            task_id,
            title: title.trim().to_string(),
        };
        let result = async {
            input.validate()?;
            let provisional = Subtask {
                id: Id::new_v4(),
                task_id,
                title: input.title.clone(),
                completed: false,
                created_at: Utc::now(),
            };
            self.subtasks
                .add(provisional, SubtaskRepo::create(&self.ctx.client, &input))
                .await
        }
        .await;
        self.ctx.reported("Could not add subtask", result)
    }

    pub async fn toggle_subtask(&self, id: Id) -> Result<Subtask, SyncError> {
        let result = async {
            let completed = !self
                .subtasks
                .get(id)
                .ok_or(CoreError::NotFound {
                    entity: "subtask",
                    id,
                })?
                .completed;
            self.subtasks
                .update(id, |s| s.completed = completed, async {
                    SubtaskRepo::set_completed(&self.ctx.client, id, completed)
                        .await
                        .map(Some)
                })
                .await
        }
        .await;
        self.ctx.reported("Could not update subtask", result)
    }

    pub async fn delete_subtask(&self, id: Id) -> Result<(), SyncError> {
        let result = self
            .subtasks
            .remove(id, SubtaskRepo::delete(&self.ctx.client, id))
            .await;
        self.ctx.reported("Could not delete subtask", result)
    }
}
