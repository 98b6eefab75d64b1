//! Reusable task templates.

use super::task::{ChecklistItem, Task, TaskDraft};
use super::{TemplateId, WorkspaceId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    pub task_template: TaskDraft,
    pub checklist_template: Vec<ChecklistItem>,
    pub workspace_id: WorkspaceId,
}

impl Template {
    pub fn new(name: impl Into<String>, workspace_id: WorkspaceId, task_template: TaskDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            task_template,
            checklist_template: Vec::new(),
            workspace_id,
        }
    }

    pub fn with_checklist_item(mut self, content: impl Into<String>) -> Self {
        self.checklist_template.push(ChecklistItem::new(content));
        self
    }

    /// Builds a new task from this template.
    ///
    /// # Invariants
    /// - Checklist items are fresh copies: new ids, not completed.
    /// - A non-empty checklist template replaces any draft checklist.
    pub fn instantiate(&self) -> Task {
        let mut draft = self.task_template.clone();
        if !self.checklist_template.is_empty() {
            draft.checklist = Some(
                self.checklist_template
                    .iter()
                    .map(|item| ChecklistItem::new(item.content.clone()))
                    .collect(),
            );
        }
        Task::from_draft(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::Template;
    use crate::model::task::{TaskDraft, TaskPriority};
    use uuid::Uuid;

    #[test]
    fn instantiate_copies_checklist_with_fresh_ids() {
        let draft = TaskDraft {
            title: Some("Release".to_string()),
            priority: Some(TaskPriority::High),
            ..TaskDraft::default()
        };
        let template = Template::new("release", Uuid::new_v4(), draft)
            .with_checklist_item("tag")
            .with_checklist_item("publish");

        let first = template.instantiate();
        let second = template.instantiate();

        assert_eq!(first.title, "Release");
        assert_eq!(first.priority, TaskPriority::High);
        assert_eq!(first.checklist.len(), 2);
        assert_ne!(first.id, second.id);
        assert_ne!(first.checklist[0].id, template.checklist_template[0].id);
        assert_ne!(first.checklist[0].id, second.checklist[0].id);
        assert!(first.checklist.iter().all(|item| !item.completed));
    }
}
