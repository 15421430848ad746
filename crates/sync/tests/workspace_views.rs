//! Inbox, timer, dashboard, admin console, documents and line items.

mod common;

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use common::{denied, notification_row, project_row, task_row, Harness};
use serde_json::json;
use taskdeck_core::error::CoreError;
use taskdeck_core::permissions::SystemPermission;
use taskdeck_core::roles::Role;
use taskdeck_core::status::{MilestoneStatus, ProjectStatus};
use taskdeck_core::stopwatch::StopwatchState;
use taskdeck_core::types::{Date, Id};
use taskdeck_db::models::project_item::{Milestone, NewMilestone, UpdateMilestone};
use taskdeck_sync::controllers::{
    AdminConsole, Dashboard, DocumentBrowser, NotificationInbox, ProjectItems, TaskTimer,
};
use taskdeck_sync::SyncError;

// ---------------------------------------------------------------------------
// NotificationInbox
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mark_all_read_flips_every_unread_notification() {
    let h = Harness::signed_in().await;
    h.backend.reply(
        "select:notifications",
        json!([
            notification_row(h.user_id, "a", false),
            notification_row(h.user_id, "b", false),
            notification_row(h.user_id, "c", true)
        ]),
    );
    let inbox = NotificationInbox::new(h.ctx.clone());
    inbox.load(false).await.unwrap();
    assert_eq!(inbox.unread_count(), 2);

    h.backend
        .reply("update:notifications", json!([{"id": Id::new_v4()}, {"id": Id::new_v4()}]));
    assert_eq!(inbox.mark_all_read().await.unwrap(), 2);
    assert_eq!(inbox.unread_count(), 0);
}

#[tokio::test]
async fn failed_mark_all_read_restores_unread_state() {
    let h = Harness::signed_in().await;
    h.backend.reply(
        "select:notifications",
        json!([notification_row(h.user_id, "a", false)]),
    );
    let inbox = NotificationInbox::new(h.ctx.clone());
    inbox.load(true).await.unwrap();
    h.backend.fail("update:notifications", denied());

    assert!(inbox.mark_all_read().await.is_err());
    assert_eq!(inbox.unread_count(), 1);

    let select = h.backend.last_call("select:notifications").unwrap();
    assert!(select.filters.iter().any(|f| f.column == "read" && f.value == "false"));
}

// ---------------------------------------------------------------------------
// TaskTimer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stopping_the_timer_saves_a_time_entry_without_paused_time() {
    let h = Harness::signed_in().await;
    let task = Id::new_v4();
    let timer = TaskTimer::new(h.ctx.clone(), task);
    let t0 = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();

    timer.start(t0).unwrap();
    timer.pause(t0 + chrono::Duration::minutes(10)).unwrap();
    timer.resume(t0 + chrono::Duration::minutes(30)).unwrap();
    assert_eq!(timer.state(), StopwatchState::Running);
    assert_eq!(
        timer.elapsed(t0 + chrono::Duration::minutes(35)),
        chrono::Duration::minutes(15)
    );

    h.backend.reply(
        "insert:time_entries",
        json!([{
            "id": Id::new_v4(),
            "task_id": task,
            "user_id": h.user_id,
            "start_time": "2025-06-02T09:00:00Z",
            "end_time": "2025-06-02T09:40:00Z",
            "duration_seconds": 1200,
            "description": null
        }]),
    );
    let entry = timer.stop(t0 + chrono::Duration::minutes(40)).await.unwrap();

    assert_eq!(entry.duration_seconds, 1200);
    assert_eq!(timer.state(), StopwatchState::Idle);
    assert_eq!(timer.total_seconds(), 1200);
    let body = h.backend.last_call("insert:time_entries").unwrap().body.unwrap();
    assert_eq!(body["duration_seconds"], 1200);
    assert_eq!(body["task_id"], json!(task));
}

#[tokio::test]
async fn stopping_an_idle_timer_is_a_conflict() {
    let h = Harness::signed_in().await;
    let timer = TaskTimer::new(h.ctx.clone(), Id::new_v4());

    let result = timer.stop(Utc::now()).await;

    assert_matches!(result, Err(SyncError::Core(CoreError::Conflict(_))));
    assert!(h.backend.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_summarizes_projects_and_tasks() {
    let h = Harness::signed_in().await;
    h.backend.reply(
        "rpc:get_user_projects",
        json!([
            project_row(h.user_id, "Acme Launch", "in-progress", 40),
            project_row(h.user_id, "Beta", "completed", 100)
        ]),
    );
    let mut overdue = task_row(Id::new_v4(), h.user_id, "Overdue", "todo");
    overdue["due_date"] = json!("2025-05-01");
    let mut soon = task_row(Id::new_v4(), h.user_id, "Soon", "in-progress");
    soon["due_date"] = json!("2025-06-05");
    h.backend.reply(
        "select:tasks",
        json!([
            overdue,
            soon,
            task_row(Id::new_v4(), h.user_id, "Done", "completed")
        ]),
    );

    let summary = Dashboard::new(h.ctx.clone())
        .summary(Date::from_ymd_opt(2025, 6, 1).unwrap())
        .await
        .unwrap();

    assert_eq!(summary.total_projects, 2);
    assert_eq!(summary.projects_by_status[&ProjectStatus::InProgress], 1);
    assert_eq!(summary.projects_by_status[&ProjectStatus::OnHold], 0);
    assert_eq!(summary.average_progress, 70.0);
    assert_eq!(summary.open_tasks, 2);
    assert_eq!(summary.completed_tasks, 1);
    assert_eq!(summary.overdue_tasks, 1);
    assert_eq!(summary.due_soon_tasks, 1);
}

// ---------------------------------------------------------------------------
// AdminConsole
// ---------------------------------------------------------------------------

fn profile_row(id: Id, name: &str, role: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "full_name": name,
        "email": null,
        "avatar_url": null,
        "role": role
    })
}

#[tokio::test]
async fn admin_console_is_forbidden_for_regular_users() {
    let h = Harness::signed_in().await;
    h.backend
        .reply("select:profiles", json!([profile_row(h.user_id, "Jane Doe", None)]));

    let console = AdminConsole::new(h.ctx.clone());

    assert_matches!(
        console.load().await,
        Err(SyncError::Core(CoreError::Forbidden(_)))
    );
    assert_eq!(h.backend.calls_to("select:system_roles"), 0);
}

#[tokio::test]
async fn failed_grant_is_undone_in_the_matrix() {
    let h = Harness::signed_in().await;
    let auditor = Id::new_v4();
    h.backend
        .reply("select:profiles", json!([profile_row(h.user_id, "Jane Doe", Some("admin"))]));
    h.backend.reply(
        "select:system_roles",
        json!([{"id": auditor, "name": "auditor", "description": null}]),
    );
    h.backend.reply(
        "select:system_role_permissions",
        json!([{"id": Id::new_v4(), "role_id": auditor, "permission": "view_audit_log"}]),
    );
    h.backend
        .reply("select:profiles", json!([profile_row(h.user_id, "Jane Doe", Some("admin"))]));

    let console = AdminConsole::new(h.ctx.clone());
    console.load().await.unwrap();
    assert!(console.matrix().grants("auditor", SystemPermission::ViewAuditLog));

    h.backend.fail("insert:system_role_permissions", denied());
    assert!(console
        .grant("auditor", SystemPermission::ManageUsers)
        .await
        .is_err());
    assert!(!console.matrix().grants("auditor", SystemPermission::ManageUsers));

    h.backend.reply("delete:system_role_permissions", json!(null));
    console
        .revoke("auditor", SystemPermission::ViewAuditLog)
        .await
        .unwrap();
    assert!(console.matrix().permissions_for("auditor").is_empty());

    assert_matches!(
        console.grant("ghost", SystemPermission::ManageUsers).await,
        Err(SyncError::Core(CoreError::Validation(_)))
    );
}

// ---------------------------------------------------------------------------
// DocumentBrowser
// ---------------------------------------------------------------------------

#[tokio::test]
async fn document_tree_nests_folders_and_files() {
    let h = Harness::signed_in().await;
    let project = Id::new_v4();
    let root = Id::new_v4();
    let child = Id::new_v4();
    h.backend.reply(
        "select:project_folders",
        json!([
            {"id": child, "project_id": project, "name": "Drafts", "parent_id": root, "created_at": "2025-06-01T09:00:00Z"},
            {"id": root, "project_id": project, "name": "Specs", "parent_id": null, "created_at": "2025-06-01T09:00:00Z"}
        ]),
    );
    h.backend.reply(
        "select:project_files",
        json!([{
            "id": Id::new_v4(),
            "project_id": project,
            "folder_id": child,
            "name": "brief.pdf",
            "file_path": "p/brief.pdf",
            "file_size": 1024,
            "mime_type": "application/pdf",
            "created_at": "2025-06-01T09:00:00Z"
        }]),
    );

    let browser = DocumentBrowser::new(h.ctx.clone(), project);
    browser.load().await.unwrap();
    let tree = browser.tree();

    assert_eq!(tree.folders.len(), 1);
    assert_eq!(tree.folders[0].folder.name, "Specs");
    assert_eq!(tree.folders[0].children[0].files[0].name, "brief.pdf");
    assert!(tree.loose_files.is_empty());
}

// ---------------------------------------------------------------------------
// ProjectItems
// ---------------------------------------------------------------------------

fn kickoff() -> NewMilestone {
    NewMilestone {
        title: "Kickoff".to_string(),
        description: None,
        due_date: Date::from_ymd_opt(2025, 9, 1),
        status: MilestoneStatus::Pending,
    }
}

#[tokio::test]
async fn failed_milestone_add_leaves_no_trace() {
    let mut h = Harness::signed_in().await;
    let items = ProjectItems::<Milestone>::new(h.ctx.clone(), Id::new_v4());
    h.backend.fail("rpc:add_project_milestone", denied());
    h.backend.fail("insert:project_milestones", denied());

    assert!(items.add(kickoff()).await.is_err());
    assert!(items.items().is_empty());
    assert_eq!(h.drain_toasts()[0].title, "Could not add milestone");
}

#[tokio::test]
async fn milestone_update_keeps_the_local_patch() {
    let h = Harness::signed_in().await;
    let project = Id::new_v4();
    let milestone = Id::new_v4();
    h.backend.reply(
        "rpc:get_project_milestones",
        json!([{
            "id": milestone,
            "project_id": project,
            "title": "Kickoff",
            "description": null,
            "due_date": "2025-09-01",
            "status": "pending",
            "created_at": "2025-06-01T09:00:00Z"
        }]),
    );
    let items = ProjectItems::<Milestone>::new(h.ctx.clone(), project);
    assert_eq!(items.load().await, 1);
    h.backend.reply("rpc:update_project_milestone", json!(null));

    let updated = items
        .update(
            milestone,
            UpdateMilestone {
                status: Some(MilestoneStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, MilestoneStatus::Completed);
    let args = h.backend.last_call("rpc:update_project_milestone").unwrap().body.unwrap();
    assert_eq!(args["p_id"], json!(milestone));
    assert_eq!(args["p_updates"]["status"], "completed");
}

#[tokio::test]
async fn viewers_may_not_add_milestones() {
    let h = Harness::signed_in().await;
    let items =
        ProjectItems::<Milestone>::new(h.ctx.clone(), Id::new_v4()).with_actor_role(Role::Viewer);

    assert_matches!(
        items.add(kickoff()).await,
        Err(SyncError::Core(CoreError::Forbidden(_)))
    );
    assert!(h.backend.calls().is_empty());
}
