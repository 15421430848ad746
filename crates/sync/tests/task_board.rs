mod common;

use assert_matches::assert_matches;
use common::{denied, task_row, Harness};
use serde_json::json;
use taskdeck_core::status::{NotificationSeverity, TaskStatus};
use taskdeck_core::types::Id;
use taskdeck_db::models::task::CreateTask;
use taskdeck_sync::controllers::{TaskBoard, TaskScope};
use taskdeck_sync::{SyncError, SyncState};

async fn board_with_task(h: &Harness, title: &str) -> (TaskBoard, Id) {
    let task = Id::new_v4();
    h.backend
        .reply("select:tasks", json!([task_row(task, h.user_id, title, "todo")]));
    let board = TaskBoard::new(h.ctx.clone(), TaskScope::CreatedBy(h.user_id));
    board.load().await.unwrap();
    (board, task)
}

// ---------------------------------------------------------------------------
// toggle_completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completing_a_task_sends_a_task_completed_notification() {
    let mut h = Harness::signed_in().await;
    let (board, task) = board_with_task(&h, "Write brief").await;

    let mut completed = task_row(task, h.user_id, "Write brief", "completed");
    completed["completed_at"] = json!("2025-06-02T12:00:00Z");
    h.backend.reply("update:tasks", json!([completed]));
    h.backend.reply(
        "insert:notifications",
        json!([{
            "id": Id::new_v4(),
            "user_id": h.user_id,
            "title": "Task completed",
            "message": "\"Write brief\" was marked as completed",
            "type": "success",
            "related_type": "task",
            "related_id": task,
            "read": false,
            "created_at": "2025-06-02T12:00:00Z"
        }]),
    );

    let updated = board.toggle_completion(task).await.unwrap();

    assert_eq!(updated.status, TaskStatus::Completed);
    assert!(updated.completed);
    assert!(updated.completed_at.is_some());

    let patch = h.backend.last_call("update:tasks").unwrap().body.unwrap();
    assert_eq!(patch["status"], "completed");
    assert_eq!(patch["completed"], true);
    assert!(patch["completed_at"].is_string());

    let note = h.backend.last_call("insert:notifications").unwrap().body.unwrap();
    assert_eq!(note["title"], "Task completed");
    assert_eq!(note["message"], "\"Write brief\" was marked as completed");
    assert_eq!(note["related_type"], "task");
    assert_eq!(note["related_id"], json!(task));
    assert_eq!(note["user_id"], json!(h.user_id));

    let toasts = h.drain_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, NotificationSeverity::Success);
    assert_eq!(toasts[0].title, "Task completed");
}

#[tokio::test]
async fn reopening_a_task_clears_completion_without_notifying() {
    let h = Harness::signed_in().await;
    let task = Id::new_v4();
    h.backend.reply(
        "select:tasks",
        json!([task_row(task, h.user_id, "Write brief", "completed")]),
    );
    let board = TaskBoard::new(h.ctx.clone(), TaskScope::CreatedBy(h.user_id));
    board.load().await.unwrap();
    h.backend
        .reply("update:tasks", json!([task_row(task, h.user_id, "Write brief", "todo")]));

    let updated = board.toggle_completion(task).await.unwrap();

    assert_eq!(updated.status, TaskStatus::Todo);
    let patch = h.backend.last_call("update:tasks").unwrap().body.unwrap();
    assert_eq!(patch["completed"], false);
    assert!(patch["completed_at"].is_null());
    assert_eq!(h.backend.calls_to("insert:notifications"), 0);
}

#[tokio::test]
async fn failed_toggle_restores_the_task() {
    let mut h = Harness::signed_in().await;
    let (board, task) = board_with_task(&h, "Write brief").await;
    h.backend.fail("update:tasks", denied());

    assert!(board.toggle_completion(task).await.is_err());

    let restored = board.tasks().into_iter().next().unwrap();
    assert_eq!(restored.status, TaskStatus::Todo);
    assert!(!restored.completed);
    assert_eq!(board.collection().state(task), Some(SyncState::Committed));
    assert_eq!(h.drain_toasts()[0].title, "Could not update task");
}

// ---------------------------------------------------------------------------
// create / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn project_board_creates_tasks_in_its_project() {
    let h = Harness::signed_in().await;
    let project = Id::new_v4();
    let board = TaskBoard::new(h.ctx.clone(), TaskScope::Project(project));
    let created = Id::new_v4();
    let mut row = task_row(created, h.user_id, "Draft plan", "todo");
    row["project_id"] = json!(project);
    h.backend.reply("insert:tasks", json!([row]));

    let task = board.create(CreateTask::new("  Draft plan ")).await.unwrap();

    assert_eq!(task.id, created);
    assert_eq!(board.tasks().len(), 1);
    let body = h.backend.last_call("insert:tasks").unwrap().body.unwrap();
    assert_eq!(body["project_id"], json!(project));
    assert_eq!(body["title"], "Draft plan");
    assert_eq!(body["user_id"], json!(h.user_id));
}

#[tokio::test]
async fn failed_create_leaves_no_trace() {
    let mut h = Harness::signed_in().await;
    let board = TaskBoard::new(h.ctx.clone(), TaskScope::CreatedBy(h.user_id));
    h.backend.fail("insert:tasks", denied());

    let result = board.create(CreateTask::new("Draft plan")).await;

    assert_matches!(result, Err(SyncError::Remote(_)));
    assert!(board.tasks().is_empty());
    assert!(!board.collection().has_pending());
    assert_eq!(h.drain_toasts()[0].title, "Could not create task");
}

#[tokio::test]
async fn create_requires_a_session() {
    let h = Harness::signed_out().await;
    let board = TaskBoard::new(h.ctx.clone(), TaskScope::CreatedBy(Id::new_v4()));

    let result = board.create(CreateTask::new("Draft plan")).await;

    assert_matches!(
        result,
        Err(SyncError::Core(taskdeck_core::error::CoreError::Unauthorized(_)))
    );
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn failed_delete_puts_the_task_back() {
    let h = Harness::signed_in().await;
    let (board, task) = board_with_task(&h, "Write brief").await;
    h.backend.fail("delete:tasks", denied());

    assert!(board.delete(task).await.is_err());
    assert_eq!(board.tasks()[0].id, task);
}

// ---------------------------------------------------------------------------
// assignees and subtasks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn assign_and_unassign_update_the_local_task() {
    let h = Harness::signed_in().await;
    let (board, task) = board_with_task(&h, "Write brief").await;
    let ana = Id::new_v4();
    h.backend.always("insert:task_assignees", Ok(json!(null)));
    h.backend.always("delete:task_assignees", Ok(json!(null)));

    let assigned = board
        .assign(task, ana, Some("Ana Ruiz".to_string()))
        .await
        .unwrap();
    assert!(assigned.is_assigned_to(ana));

    let unassigned = board.unassign(task, ana).await.unwrap();
    assert!(!unassigned.is_assigned_to(ana));
}

#[tokio::test]
async fn failed_assign_is_rolled_back() {
    let h = Harness::signed_in().await;
    let (board, task) = board_with_task(&h, "Write brief").await;
    h.backend.fail("insert:task_assignees", denied());

    assert!(board.assign(task, Id::new_v4(), None).await.is_err());
    assert!(board.tasks()[0].assignees.is_empty());
}

#[tokio::test]
async fn subtasks_add_toggle_and_roll_back() {
    let h = Harness::signed_in().await;
    let task = Id::new_v4();
    let board = TaskBoard::new(h.ctx.clone(), TaskScope::CreatedBy(h.user_id));
    let subtask = Id::new_v4();
    let row = json!({
        "id": subtask,
        "task_id": task,
        "title": "Outline",
        "completed": false,
        "created_at": "2025-06-01T09:00:00Z"
    });
    h.backend.reply("insert:task_subtasks", json!([row.clone()]));

    let added = board.add_subtask(task, "Outline").await.unwrap();
    assert_eq!(added.id, subtask);

    let mut done = row;
    done["completed"] = json!(true);
    h.backend.reply("update:task_subtasks", json!([done]));
    assert!(board.toggle_subtask(subtask).await.unwrap().completed);

    h.backend.fail("insert:task_subtasks", denied());
    assert!(board.add_subtask(task, "Review").await.is_err());
    assert_eq!(board.subtasks().len(), 1);
}
