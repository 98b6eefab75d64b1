//! Workspace activity feed.

use crate::model::activity::{Activity, ActivityKind};
use crate::model::user::User;
use crate::model::workspace::Workspace;

const UNKNOWN_USER: &str = "Someone";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry<'a> {
    pub activity: &'a Activity,
    pub description: String,
}

/// Activities about the workspace or any of its tasks, newest first.
pub fn workspace_activity<'a>(
    activities: &'a [Activity],
    users: &[User],
    workspace: &Workspace,
) -> Vec<ActivityEntry<'a>> {
    let mut entries = activities
        .iter()
        .rev()
        .filter(|activity| {
            activity.entity_id == workspace.id || workspace.contains_task(activity.entity_id)
        })
        .map(|activity| ActivityEntry {
            activity,
            description: describe_activity(activity, users),
        })
        .collect::<Vec<_>>();
    entries.sort_by(|left, right| right.activity.created_at.cmp(&left.activity.created_at));
    entries
}

/// Renders a one-line description, naming unknown users "Someone".
pub fn describe_activity(activity: &Activity, users: &[User]) -> String {
    let name = activity
        .user_id
        .and_then(|user_id| users.iter().find(|user| user.id == user_id))
        .map_or(UNKNOWN_USER, |user| user.name.as_str());

    match &activity.kind {
        ActivityKind::TaskCreated { task_title } => format!("{name} created task \"{task_title}\""),
        ActivityKind::TaskUpdated { task_title } => format!("{name} updated task \"{task_title}\""),
        ActivityKind::CommentAdded { task_title, .. } => {
            format!("{name} commented on \"{task_title}\"")
        }
        ActivityKind::MemberJoined {} => format!("{name} joined the workspace"),
        ActivityKind::StatusChanged {
            task_title,
            new_status,
            ..
        } => format!(
            "{name} changed status of \"{task_title}\" to {}",
            new_status.as_str()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{describe_activity, workspace_activity};
    use crate::model::activity::{Activity, ActivityKind};
    use crate::model::task::{Task, TaskStatus};
    use crate::model::user::User;
    use crate::model::workspace::Workspace;
    use chrono::Duration;
    use uuid::Uuid;

    #[test]
    fn unknown_user_renders_as_someone() {
        let activity = Activity::new(
            ActivityKind::TaskCreated {
                task_title: "Write docs".to_string(),
            },
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
        );
        assert_eq!(
            describe_activity(&activity, &[]),
            "Someone created task \"Write docs\""
        );
    }

    #[test]
    fn status_change_uses_wire_status_name() {
        let user = User::new("Ada", "ada@example.com");
        let activity = Activity::new(
            ActivityKind::StatusChanged {
                task_title: "Ship".to_string(),
                previous_status: TaskStatus::Todo,
                new_status: TaskStatus::InProgress,
            },
            Uuid::new_v4(),
            Some(user.id),
        );
        assert_eq!(
            describe_activity(&activity, &[user]),
            "Ada changed status of \"Ship\" to in-progress"
        );
    }

    #[test]
    fn feed_is_scoped_to_workspace_and_newest_first() {
        let mut workspace = Workspace::new("w", "");
        let task = Task::new("mine");
        let task_id = task.id;
        workspace.tasks.push(task);

        let mut joined = Activity::new(ActivityKind::MemberJoined {}, workspace.id, None);
        joined.created_at -= Duration::minutes(1);
        let created = Activity::new(
            ActivityKind::TaskCreated {
                task_title: "mine".to_string(),
            },
            task_id,
            None,
        );
        let foreign = Activity::new(ActivityKind::MemberJoined {}, Uuid::new_v4(), None);

        let activities = vec![joined, created, foreign];
        let feed = workspace_activity(&activities, &[], &workspace);
        let kinds = feed
            .iter()
            .map(|entry| entry.activity.kind.type_name())
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec!["task_created", "member_joined"]);
    }
}
