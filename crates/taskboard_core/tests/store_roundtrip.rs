use chrono::{Duration, Utc};
use taskboard_core::model::automation::{Automation, AutomationAction, AutomationTrigger};
use taskboard_core::model::filter::{Filter, FilterCondition};
use taskboard_core::model::integration::IntegrationKind;
use taskboard_core::model::task::{Attachment, AttachmentKind, ChecklistItem, Task};
use taskboard_core::model::template::Template;
use taskboard_core::model::user::{User, UserRole};
use taskboard_core::model::workspace::Workspace;
use taskboard_core::repo::collections::{load_current_user, save_current_user};
use taskboard_core::service::board_service::save_collection;
use taskboard_core::{
    load, load_state, open_db, save, AppState, Collection, Command, KeyValueStore,
    MemoryKeyValueStore, SqliteKeyValueStore, StoreError, TaskDraft, TaskPriority, TaskStatus,
};
use uuid::Uuid;

fn apply(state: AppState, command: Command) -> (AppState, Option<Uuid>) {
    let transition = state.apply(command).unwrap();
    (transition.state, transition.created)
}

/// Builds a state with at least one record in every collection.
fn populated_state() -> AppState {
    let (state, ada) = apply(
        AppState::default(),
        Command::AddTeamMember {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Admin,
        },
    );
    let ada = ada.unwrap();
    let current = state.user(ada).cloned().unwrap();
    let (state, _) = apply(state, Command::SetCurrentUser { user: current });
    let (state, bob) = apply(
        state,
        Command::AddTeamMember {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            role: UserRole::Member,
        },
    );
    let bob = bob.unwrap();

    let (state, workspace_id) = apply(
        state,
        Command::CreateWorkspace {
            name: "Release".to_string(),
            description: "v2 launch".to_string(),
        },
    );
    let workspace_id = workspace_id.unwrap();
    let (state, label_id) = apply(
        state,
        Command::CreateLabel {
            workspace_id,
            name: "blocker".to_string(),
            color: "#ef4444".to_string(),
        },
    );

    let draft = TaskDraft {
        description: Some("Ship \"v2\" ✨".to_string()),
        priority: Some(TaskPriority::High),
        due_date: Some(Utc::now() + Duration::hours(6)),
        assigned_to: Some(bob),
        labels: Some(vec![label_id.unwrap()]),
        attachments: Some(vec![Attachment::new(
            "plan.pdf",
            "https://example.com/plan.pdf",
            AttachmentKind::Document,
        )]),
        checklist: Some(vec![ChecklistItem::new("changelog")]),
        time_estimate: Some(90),
        watchers: Some(vec![ada]),
        ..TaskDraft::titled("Cut release")
    };
    let (state, task_id) = apply(
        state,
        Command::CreateTask {
            workspace_id,
            draft,
        },
    );
    let task_id = task_id.unwrap();
    let (state, _) = apply(
        state,
        Command::AddComment {
            task_id,
            content: "Looks good".to_string(),
        },
    );
    let (state, entry_id) = apply(state, Command::StartTimer { task_id });
    let (state, _) = apply(
        state,
        Command::StopTimer {
            entry_id: entry_id.unwrap(),
            at: Utc::now() + Duration::minutes(25),
        },
    );
    let (state, _) = apply(
        state,
        Command::SaveTemplate {
            template: Template::new("Bug", workspace_id, TaskDraft::titled("Bug: "))
                .with_checklist_item("reproduce"),
        },
    );
    let (state, _) = apply(
        state,
        Command::ToggleIntegration {
            workspace_id,
            kind: IntegrationKind::Slack,
        },
    );
    let (state, _) = apply(
        state,
        Command::CreateAutomation {
            automation: Automation::new(
                "notify on done",
                workspace_id,
                AutomationTrigger::StatusChanged {
                    to: Some(TaskStatus::Completed),
                },
            )
            .with_action(AutomationAction::SendNotification {
                user_id: None,
                message: "done".to_string(),
            }),
        },
    );
    let (state, _) = apply(
        state,
        Command::CreateFilter {
            filter: Filter::new("mine", workspace_id).with_condition(FilterCondition::Assignee {
                value: Some(bob),
            }),
        },
    );
    let (state, _) = apply(
        state,
        Command::SetTaskStatus {
            workspace_id,
            task_id,
            status: TaskStatus::Completed,
        },
    );
    state
}

#[test]
fn every_collection_round_trips_through_memory_store() {
    let state = populated_state();
    for (name, empty) in [
        ("workspaces", state.workspaces.is_empty()),
        ("users", state.users.is_empty()),
        ("labels", state.labels.is_empty()),
        ("activities", state.activities.is_empty()),
        ("comments", state.comments.is_empty()),
        ("time_entries", state.time_entries.is_empty()),
        ("templates", state.templates.is_empty()),
        ("integrations", state.integrations.is_empty()),
        ("automations", state.automations.is_empty()),
        ("filters", state.filters.is_empty()),
        ("notifications", state.notifications.is_empty()),
    ] {
        assert!(!empty, "{name} should be populated");
    }

    let store = MemoryKeyValueStore::new();
    for collection in Collection::ALL {
        save_collection(&store, &state, collection).unwrap();
    }

    assert_eq!(load_state(&store).unwrap(), state);
}

#[test]
fn never_saved_collections_load_empty() {
    let store = MemoryKeyValueStore::new();
    assert!(load::<Workspace>(&store).unwrap().is_empty());
    assert!(load::<User>(&store).unwrap().is_empty());
    assert_eq!(load_current_user(&store).unwrap(), None);
    assert_eq!(load_state(&store).unwrap(), AppState::default());
}

#[test]
fn malformed_payload_surfaces_decode_error() {
    let store = MemoryKeyValueStore::new();
    store
        .set(Collection::Workspaces.key(), "{not json")
        .unwrap();

    match load::<Workspace>(&store) {
        Err(StoreError::Decode { key, .. }) => assert_eq!(key, "taskify-workspaces"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn workspace_with_new_task_survives_sqlite_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let mut workspace = Workspace::new("Garden", "");
    let task = Task::new("Plant tomatoes");
    workspace.tasks.push(task.clone());
    let user = User::new("Grace", "grace@example.com");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        save(&store, std::slice::from_ref(&workspace)).unwrap();
        save_current_user(&store, &user).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();
    let loaded = load::<Workspace>(&store).unwrap();
    assert_eq!(loaded, vec![workspace]);
    assert_eq!(loaded[0].tasks[0], task);
    assert_eq!(load_current_user(&store).unwrap(), Some(user));
}

#[test]
fn persisted_layout_uses_camel_case_and_tagged_payloads() {
    let state = populated_state();
    let store = MemoryKeyValueStore::new();
    save_collection(&store, &state, Collection::Workspaces).unwrap();
    save_collection(&store, &state, Collection::Activities).unwrap();

    let workspaces: serde_json::Value =
        serde_json::from_str(&store.get("taskify-workspaces").unwrap().unwrap()).unwrap();
    let task = &workspaces[0]["tasks"][0];
    assert_eq!(task["status"], "completed");
    assert_eq!(task["timeSpent"], 25);
    assert!(task["dueDate"].is_string());
    assert!(workspaces[0]["settings"]["notificationsEnabled"].is_boolean());

    let activities: serde_json::Value =
        serde_json::from_str(&store.get("taskify-activities").unwrap().unwrap()).unwrap();
    let created = activities
        .as_array()
        .unwrap()
        .iter()
        .find(|activity| activity["type"] == "task_created")
        .unwrap();
    assert_eq!(created["details"]["taskTitle"], "Cut release");
}

#[test]
fn legacy_payloads_with_blank_ids_load() {
    let workspace_id = "0d7c8c44-1c4e-4f0a-9a57-3f1b1f2f6a10";
    let task_id = "7b1f4d7e-2c6a-4c11-8f0e-5a2d9b3c4e21";
    let stamp = "2024-03-01T12:00:00.000Z";
    let store = MemoryKeyValueStore::new();
    let workspaces = serde_json::json!([{
        "id": workspace_id,
        "name": "Home",
        "description": "",
        "tasks": [{
            "id": task_id,
            "title": "Sweep",
            "description": "",
            "status": "todo",
            "priority": "medium",
            "dueDate": stamp,
            "createdAt": stamp,
            "assignedTo": "",
            "labels": [],
            "attachments": [],
            "checklist": [],
            "timeEstimate": 0,
            "timeSpent": 0,
            "watchers": []
        }],
        "members": [],
        "createdAt": stamp,
        "updatedAt": stamp,
        "icon": "📋",
        "color": "#6366F1",
        "isArchived": false,
        "settings": {
            "defaultView": "board",
            "allowGuestAccess": false,
            "notificationsEnabled": true,
            "autoArchiveCompleted": false
        }
    }]);
    let activities = serde_json::json!([
        {
            "id": "9a3e6f10-4b2d-4d8e-b1c7-0e5f6a7b8c90",
            "type": "member_joined",
            "entityId": workspace_id,
            "userId": "",
            "details": {},
            "createdAt": stamp
        },
        {
            "id": "1c2d3e4f-5a6b-4c7d-8e9f-a0b1c2d3e4f5",
            "type": "task_created",
            "entityId": task_id,
            "userId": "",
            "details": { "taskTitle": "Sweep" },
            "createdAt": stamp
        }
    ]);
    let time_entries = serde_json::json!([{
        "id": "2e3f4a5b-6c7d-4e8f-9a0b-1c2d3e4f5a6b",
        "taskId": task_id,
        "userId": "",
        "startTime": stamp,
        "endTime": null,
        "description": ""
    }]);
    for (collection, value) in [
        (Collection::Workspaces, workspaces),
        (Collection::Activities, activities),
        (Collection::TimeEntries, time_entries),
    ] {
        store.set(collection.key(), &value.to_string()).unwrap();
    }

    let state = load_state(&store).unwrap();
    let task = &state.workspaces[0].tasks[0];
    assert_eq!(task.title, "Sweep");
    assert_eq!(task.assigned_to, None);
    assert_eq!(state.activities.len(), 2);
    assert!(state.activities.iter().all(|activity| activity.user_id.is_none()));
    assert_eq!(state.time_entries[0].user_id, None);
    assert!(state.time_entries[0].is_running());
}
