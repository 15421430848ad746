mod common;

use assert_matches::assert_matches;
use common::{client, denied, member_row, missing_function};
use serde_json::json;
use taskdeck_core::roles::Role;
use taskdeck_core::types::Id;
use taskdeck_db::models::team_member::AddMember;
use taskdeck_db::repositories::TeamRepo;
use taskdeck_remote::testing::ScriptedBackend;
use taskdeck_remote::{ErrorKind, RemoteError};

// ---------------------------------------------------------------------------
// list_members
// ---------------------------------------------------------------------------

#[tokio::test]
async fn safe_rpc_answer_short_circuits_the_chain() {
    let backend = ScriptedBackend::new();
    let project = Id::new_v4();
    backend.reply(
        "rpc:get_project_members_safe",
        json!([member_row(project, "Jane Doe", "Project Manager")]),
    );

    let members = TeamRepo::list_members(&client(&backend), project).await;

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, Role::ProjectManager);
    assert_eq!(backend.call_labels(), vec!["rpc:get_project_members_safe"]);
}

#[tokio::test]
async fn failing_rpcs_fall_back_to_direct_read() {
    let backend = ScriptedBackend::new();
    let project = Id::new_v4();
    backend.fail("rpc:get_project_members_safe", missing_function());
    backend.fail("rpc:get_project_members", denied());
    backend.reply(
        "select:project_members",
        json!([{
            "id": Id::new_v4(),
            "project_id": project,
            "user_id": Id::new_v4(),
            "role": "designer",
            "profiles": {"full_name": "Ana Ruiz"}
        }]),
    );

    let members = TeamRepo::list_members(&client(&backend), project).await;

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "Ana Ruiz");
    assert_eq!(
        backend.call_labels(),
        vec![
            "rpc:get_project_members_safe",
            "rpc:get_project_members",
            "select:project_members"
        ]
    );
}

#[tokio::test]
async fn exhausted_chain_is_an_empty_roster() {
    let backend = ScriptedBackend::new();
    backend.fail("rpc:get_project_members_safe", denied());
    backend.fail("rpc:get_project_members", denied());
    backend.fail("select:project_members", denied());

    let members = TeamRepo::list_members(&client(&backend), Id::new_v4()).await;
    assert!(members.is_empty());
    assert_eq!(backend.calls().len(), 3);
}

#[tokio::test]
async fn empty_rpc_result_does_not_hide_direct_rows() {
    let backend = ScriptedBackend::new();
    let project = Id::new_v4();
    backend.reply("rpc:get_project_members_safe", json!([]));
    backend.reply("rpc:get_project_members", json!([]));
    backend.reply(
        "select:project_members",
        json!([member_row(project, "Sam Lee", "viewer")]),
    );

    let members = TeamRepo::list_members(&client(&backend), project).await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, Role::Viewer);
}

// ---------------------------------------------------------------------------
// writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_member_falls_back_to_insert() {
    let backend = ScriptedBackend::new();
    let project = Id::new_v4();
    backend.fail("rpc:add_project_member", denied());
    backend.reply(
        "insert:project_members",
        json!([member_row(project, "Jane Doe", "project_manager")]),
    );

    let input = AddMember::from_input(Id::new_v4(), "Jane Doe", "Project Manager");
    let member = TeamRepo::add_member(&client(&backend), project, &input)
        .await
        .unwrap();

    assert_eq!(member.role, Role::ProjectManager);
    let insert = backend.last_call("insert:project_members").unwrap();
    assert_eq!(insert.body.unwrap()["role"], "project_manager");
}

#[tokio::test]
async fn add_member_reads_back_when_rpc_returns_void() {
    let backend = ScriptedBackend::new();
    let project = Id::new_v4();
    backend.reply("rpc:add_project_member", serde_json::Value::Null);
    backend.reply(
        "select:project_members",
        json!([member_row(project, "Jane Doe", "developer")]),
    );

    let input = AddMember::from_input(Id::new_v4(), "Jane Doe", "developer");
    let member = TeamRepo::add_member(&client(&backend), project, &input)
        .await
        .unwrap();

    assert_eq!(member.role, Role::Developer);
    assert_eq!(backend.calls_to("insert:project_members"), 0);
}

#[tokio::test]
async fn add_member_id_reply_reads_row_by_id() {
    let backend = ScriptedBackend::new();
    let project = Id::new_v4();
    let stored = member_row(project, "Jane Doe", "developer");
    let id = stored["id"].clone();
    backend.reply("rpc:add_project_member", id.clone());
    backend.reply("select:project_members", json!([stored]));
    backend.fail("insert:project_members", RemoteError::not_found("duplicate key"));

    let input = AddMember::from_input(Id::new_v4(), "Jane Doe", "developer");
    let member = TeamRepo::add_member(&client(&backend), project, &input)
        .await
        .unwrap();

    assert_eq!(json!(member.id), id);
    assert_eq!(backend.calls_to("insert:project_members"), 0);
    let read = backend.last_call("select:project_members").unwrap();
    assert_eq!(read.filters[0].column, "id");
    assert_eq!(read.limit, Some(1));
}

#[tokio::test]
async fn failed_role_change_carries_classification() {
    let backend = ScriptedBackend::new();
    backend.fail("rpc:assign_project_role", missing_function());
    backend.fail("update:project_members", denied());

    let err = TeamRepo::update_role(&client(&backend), Id::new_v4(), Id::new_v4(), Role::Viewer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn remove_member_prefers_rpc() {
    let backend = ScriptedBackend::new();
    backend.reply("rpc:remove_project_member", serde_json::Value::Null);

    let result = TeamRepo::remove_member(&client(&backend), Id::new_v4(), Id::new_v4()).await;
    assert_matches!(result, Ok(()));
    assert_eq!(backend.calls_to("delete:project_members"), 0);
}
