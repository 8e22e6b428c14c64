//! Cross-client task board projection.
//!
//! # Responsibility
//! - Flatten every client's tasks into one list annotated with the owner.
//! - Apply assignee, completion and text filters.
//! - Order rows: open before completed, then by due date with undated last.

use crate::model::client::{Client, ClientId};
use crate::model::task::Task;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Assignee selection for the task board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssigneeFilter {
    #[default]
    All,
    Unassigned,
    Named(String),
}

impl AssigneeFilter {
    pub fn matches(&self, assignee: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Unassigned => assignee.is_none(),
            Self::Named(name) => assignee == Some(name.as_str()),
        }
    }
}

impl FromStr for AssigneeFilter {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "all" => Self::All,
            "" | "unassigned" => Self::Unassigned,
            _ => Self::Named(trimmed.to_string()),
        })
    }
}

/// Completion selection for the task board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl CompletionFilter {
    pub fn matches(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !completed,
            Self::Completed => completed,
        }
    }
}

impl FromStr for CompletionFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" | "open" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(format!(
                "unsupported completion filter `{other}`; expected all|pending|completed"
            )),
        }
    }
}

/// User-selected task board filter state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskQuery {
    /// Case-insensitive substring of task text or client name.
    pub search: String,
    pub assignee: AssigneeFilter,
    pub completion: CompletionFilter,
}

/// One task annotated with its owning client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub client_id: ClientId,
    pub client_name: String,
    pub task: Task,
}

/// Flattens all client tasks in snapshot order.
pub fn flatten_tasks(clients: &[Client]) -> Vec<TaskRow> {
    clients
        .iter()
        .flat_map(|client| {
            client.tasks.iter().map(move |task| TaskRow {
                client_id: client.id,
                client_name: client.name.clone(),
                task: task.clone(),
            })
        })
        .collect()
}

/// Returns the filtered, ordered task board for `query`.
pub fn project_tasks(clients: &[Client], query: &TaskQuery) -> Vec<TaskRow> {
    let needle = query.search.trim().to_lowercase();
    let mut rows: Vec<TaskRow> = flatten_tasks(clients)
        .into_iter()
        .filter(|row| query.assignee.matches(row.task.assignee.as_deref()))
        .filter(|row| query.completion.matches(row.task.completed))
        .filter(|row| {
            needle.is_empty()
                || row.task.text.to_lowercase().contains(&needle)
                || row.client_name.to_lowercase().contains(&needle)
        })
        .collect();

    rows.sort_by(|a, b| compare_tasks(&a.task, &b.task));
    rows
}

/// Open tasks first; within a group earlier due dates first, undated last.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Distinct named assignees across all clients, sorted.
pub fn list_assignees(clients: &[Client]) -> Vec<String> {
    clients
        .iter()
        .flat_map(|client| client.tasks.iter())
        .filter_map(|task| task.assignee.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{AssigneeFilter, CompletionFilter};

    #[test]
    fn assignee_filter_parses_sentinels() {
        assert_eq!("all".parse::<AssigneeFilter>().unwrap(), AssigneeFilter::All);
        assert_eq!("All".parse::<AssigneeFilter>().unwrap(), AssigneeFilter::All);
        assert_eq!("".parse::<AssigneeFilter>().unwrap(), AssigneeFilter::Unassigned);
        assert_eq!(
            " Unassigned ".parse::<AssigneeFilter>().unwrap(),
            AssigneeFilter::Unassigned
        );
        assert_eq!(
            "Tanaka".parse::<AssigneeFilter>().unwrap(),
            AssigneeFilter::Named("Tanaka".to_string())
        );
    }

    #[test]
    fn unassigned_matches_only_missing_assignee() {
        assert!(AssigneeFilter::Unassigned.matches(None));
        assert!(!AssigneeFilter::Unassigned.matches(Some("Kim")));
        assert!(!CompletionFilter::Pending.matches(true));
    }
}
