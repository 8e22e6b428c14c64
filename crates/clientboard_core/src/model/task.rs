//! Task domain model.
//!
//! # Responsibility
//! - Define the to-do item attached to a client engagement.
//! - Provide the closed set of editable task fields.
//!
//! # Invariants
//! - A task always belongs to exactly one client.
//! - `id` is unique within the owning client's task list.

use super::wire;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task inside its owning client.
pub type TaskId = Uuid;

/// To-do item tracked for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "wire::blank_date")]
    pub due_date: Option<NaiveDate>,
    /// Person responsible, `None` when unassigned.
    #[serde(default, with = "wire::blank_string")]
    pub assignee: Option<String>,
}

impl Task {
    /// Creates an incomplete, undated, unassigned task.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            due_date: None,
            assignee: None,
        }
    }

    /// Returns whether the task is still open and its due date has passed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Editable task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskField {
    Text(String),
    Completed(bool),
    DueDate(Option<NaiveDate>),
    /// Blank names are stored as unassigned.
    Assignee(Option<String>),
}

impl TaskField {
    /// Writes this field value into `task`.
    pub fn apply(self, task: &mut Task) {
        match self {
            Self::Text(text) => task.text = text,
            Self::Completed(completed) => task.completed = completed,
            Self::DueDate(due_date) => task.due_date = due_date,
            Self::Assignee(assignee) => {
                task.assignee = assignee
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty());
            }
        }
    }

    /// Stable field name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Completed(_) => "completed",
            Self::DueDate(_) => "due_date",
            Self::Assignee(_) => "assignee",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskField};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn overdue_requires_open_task_with_past_due_date() {
        let mut task = Task::new("send invoice");
        assert!(!task.is_overdue(day(10)));

        task.due_date = Some(day(9));
        assert!(task.is_overdue(day(10)));
        assert!(!task.is_overdue(day(9)));

        task.toggle();
        assert!(!task.is_overdue(day(10)));
    }

    #[test]
    fn blank_assignee_is_stored_as_unassigned() {
        let mut task = Task::new("call client");
        TaskField::Assignee(Some("  Sato ".to_string())).apply(&mut task);
        assert_eq!(task.assignee.as_deref(), Some("Sato"));

        TaskField::Assignee(Some("   ".to_string())).apply(&mut task);
        assert_eq!(task.assignee, None);
    }

    #[test]
    fn stored_document_with_blank_fields_decodes() {
        let json = r#"{"id":"6f1c4c1e-4a8e-4a51-9f5e-0d1f7b1f2a10","text":"draft deck","completed":false,"dueDate":"","assignee":""}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.due_date, None);
        assert_eq!(task.assignee, None);

        let encoded = serde_json::to_value(&task).unwrap();
        assert_eq!(encoded["dueDate"], "");
        assert_eq!(encoded["assignee"], "");
    }
}
