mod common;

use assert_matches::assert_matches;
use common::{denied, member_row, Harness};
use serde_json::json;
use taskdeck_core::error::CoreError;
use taskdeck_core::roles::Role;
use taskdeck_core::status::NotificationSeverity;
use taskdeck_core::types::Id;
use taskdeck_remote::RemoteError;
use taskdeck_sync::controllers::TeamRoster;
use taskdeck_sync::SyncError;

fn roster_with_manager(h: &Harness, project: Id, manager: Id) -> TeamRoster {
    h.backend.reply(
        "rpc:get_project_members_safe",
        json!([member_row(project, manager, "Sam Lee", "Project Manager")]),
    );
    TeamRoster::new(h.ctx.clone(), project)
}

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exhausted_member_chain_loads_an_empty_roster() {
    let h = Harness::signed_in().await;
    h.backend.fail("rpc:get_project_members_safe", denied());
    h.backend.fail("rpc:get_project_members", RemoteError::not_found("no function"));
    h.backend.fail("select:project_members", denied());
    let roster = TeamRoster::new(h.ctx.clone(), Id::new_v4());

    assert_eq!(roster.load().await, 0);
    assert!(roster.members().is_empty());
    assert_eq!(
        h.backend.call_labels(),
        vec![
            "rpc:get_project_members_safe",
            "rpc:get_project_members",
            "select:project_members"
        ]
    );
}

// ---------------------------------------------------------------------------
// add_member
// ---------------------------------------------------------------------------

#[tokio::test]
async fn adding_a_project_manager_demotes_the_current_one() {
    let h = Harness::signed_in().await;
    let project = Id::new_v4();
    let sam = Id::new_v4();
    let jane = Id::new_v4();
    let roster = roster_with_manager(&h, project, sam);
    roster.load().await;

    h.backend.reply(
        "rpc:add_project_member",
        json!([member_row(project, jane, "Jane Doe", "project_manager")]),
    );
    h.backend.reply("rpc:assign_project_role", json!(null));

    let added = roster
        .add_member(jane, "Jane Doe", "Project Manager")
        .await
        .unwrap();

    assert_eq!(added.role, Role::ProjectManager);
    assert_eq!(added.name, "Jane Doe");

    let managers = roster.project_managers();
    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0].user_id, jane);
    let sam_row = roster.members().into_iter().find(|m| m.user_id == sam).unwrap();
    assert_eq!(sam_row.role, Role::TeamMember);

    let add = h.backend.last_call("rpc:add_project_member").unwrap().body.unwrap();
    assert_eq!(add["p_role"], "project_manager");
    let demote = h.backend.last_call("rpc:assign_project_role").unwrap().body.unwrap();
    assert_eq!(demote["p_user_id"], json!(sam));
    assert_eq!(demote["p_role"], "team_member");
}

#[tokio::test]
async fn placeholder_name_is_replaced_with_the_entered_name() {
    let h = Harness::signed_in().await;
    let project = Id::new_v4();
    let user = Id::new_v4();
    let roster = TeamRoster::new(h.ctx.clone(), project);

    h.backend.reply(
        "rpc:add_project_member",
        json!([{
            "id": Id::new_v4(),
            "project_id": project,
            "user_id": user,
            "role": "qa"
        }]),
    );

    let added = roster.add_member(user, "Ana Ruiz", "QA").await.unwrap();
    assert_eq!(added.name, "Ana Ruiz");
    assert_eq!(added.role, Role::Tester);
}

#[tokio::test]
async fn failed_add_leaves_no_trace_and_shows_an_error() {
    let mut h = Harness::signed_in().await;
    let project = Id::new_v4();
    let roster = TeamRoster::new(h.ctx.clone(), project);
    h.backend.fail("rpc:add_project_member", denied());
    h.backend.fail("insert:project_members", denied());

    let result = roster.add_member(Id::new_v4(), "Jane Doe", "developer").await;

    assert_matches!(result, Err(SyncError::Remote(_)));
    assert!(roster.members().is_empty());
    let toasts = h.drain_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, NotificationSeverity::Error);
    assert_eq!(toasts[0].title, "Could not add team member");
    assert_eq!(
        toasts[0].message,
        "You do not have permission to perform this action."
    );
}

#[tokio::test]
async fn duplicate_member_is_rejected_before_any_remote_call() {
    let h = Harness::signed_in().await;
    let project = Id::new_v4();
    let sam = Id::new_v4();
    let roster = roster_with_manager(&h, project, sam);
    roster.load().await;
    let calls_before = h.backend.calls().len();

    let result = roster.add_member(sam, "Sam Lee", "developer").await;

    assert_matches!(result, Err(SyncError::Core(CoreError::Conflict(_))));
    assert_eq!(h.backend.calls().len(), calls_before);
}

#[tokio::test]
async fn blank_name_fails_validation() {
    let h = Harness::signed_in().await;
    let roster = TeamRoster::new(h.ctx.clone(), Id::new_v4());

    let result = roster.add_member(Id::new_v4(), "   ", "developer").await;

    assert_matches!(result, Err(SyncError::Core(CoreError::Validation(_))));
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn viewers_may_not_manage_the_team() {
    let h = Harness::signed_in().await;
    let roster = TeamRoster::new(h.ctx.clone(), Id::new_v4()).with_actor_role(Role::Viewer);

    let result = roster.add_member(Id::new_v4(), "Jane Doe", "developer").await;

    assert_matches!(result, Err(SyncError::Core(CoreError::Forbidden(_))));
    assert!(h.backend.calls().is_empty());
}

// ---------------------------------------------------------------------------
// remove_member / change_role
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_remove_restores_the_member() {
    let h = Harness::signed_in().await;
    let project = Id::new_v4();
    let sam = Id::new_v4();
    let roster = roster_with_manager(&h, project, sam);
    roster.load().await;
    let member_id = roster.members()[0].id;

    h.backend.fail("rpc:remove_project_member", denied());
    h.backend.fail("delete:project_members", denied());

    assert!(roster.remove_member(member_id).await.is_err());
    assert_eq!(roster.members().len(), 1);
    assert_eq!(roster.members()[0].id, member_id);
}

#[tokio::test]
async fn promoting_a_member_demotes_the_previous_manager() {
    let h = Harness::signed_in().await;
    let project = Id::new_v4();
    let sam = Id::new_v4();
    let dev = Id::new_v4();
    h.backend.reply(
        "rpc:get_project_members_safe",
        json!([
            member_row(project, sam, "Sam Lee", "project_manager"),
            member_row(project, dev, "Dee Vance", "developer")
        ]),
    );
    let roster = TeamRoster::new(h.ctx.clone(), project);
    roster.load().await;
    h.backend.always("rpc:assign_project_role", Ok(json!(null)));

    let dev_member = roster.members().into_iter().find(|m| m.user_id == dev).unwrap();
    roster
        .change_role(dev_member.id, Role::ProjectManager)
        .await
        .unwrap();

    let managers = roster.project_managers();
    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0].user_id, dev);
    assert_eq!(h.backend.calls_to("rpc:assign_project_role"), 2);
}

#[tokio::test]
async fn failed_role_change_rolls_back() {
    let h = Harness::signed_in().await;
    let project = Id::new_v4();
    let sam = Id::new_v4();
    let roster = roster_with_manager(&h, project, sam);
    roster.load().await;
    let member_id = roster.members()[0].id;
    h.backend.fail("rpc:assign_project_role", denied());
    h.backend.fail("update:project_members", denied());

    assert!(roster.change_role(member_id, Role::Viewer).await.is_err());
    assert_eq!(roster.members()[0].role, Role::ProjectManager);
}
