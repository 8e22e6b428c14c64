//! Client domain model.
//!
//! # Responsibility
//! - Define the consulting engagement record and its lifecycle status.
//! - Provide validation and per-card derived metrics.
//!
//! # Invariants
//! - `name` is never blank.
//! - Task and meeting log ids are unique within one client.
//! - `contract_end` is not earlier than `contract_start` when both are set.
//! - `tasks` and `meeting_logs` are never absent; stored documents missing
//!   them decode as empty.

use super::meeting_log::{sorted_by_date_desc, MeetingLog, MeetingLogId};
use super::task::{Task, TaskId};
use super::wire;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a client document.
pub type ClientId = Uuid;

/// Number of days ahead in which a meeting is flagged as soon.
const MEETING_SOON_DAYS: i64 = 3;

/// Engagement lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Onboarding,
    Active,
    Pending,
    Completed,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 4] = [
        ClientStatus::Onboarding,
        ClientStatus::Active,
        ClientStatus::Pending,
        ClientStatus::Completed,
    ];

    /// Wire value used in stored documents and prompts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Onboarding => "Onboarding",
            Self::Active => "In progress",
            Self::Pending => "On hold",
            Self::Completed => "Completed",
        }
    }
}

impl Display for ClientStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = ClientValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ClientValidationError::UnknownStatus(value.to_string()))
    }
}

/// Validation failures for client records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientValidationError {
    BlankName,
    UnknownStatus(String),
    DuplicateTaskId(TaskId),
    DuplicateMeetingLogId(MeetingLogId),
    ContractRangeInverted { start: NaiveDate, end: NaiveDate },
}

impl Display for ClientValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "client name must not be blank"),
            Self::UnknownStatus(value) => write!(
                f,
                "unknown client status `{value}`; expected onboarding|active|pending|completed"
            ),
            Self::DuplicateTaskId(id) => write!(f, "duplicate task id within client: {id}"),
            Self::DuplicateMeetingLogId(id) => {
                write!(f, "duplicate meeting log id within client: {id}")
            }
            Self::ContractRangeInverted { start, end } => {
                write!(f, "contract end {end} is earlier than contract start {start}")
            }
        }
    }
}

impl Error for ClientValidationError {}

/// Consulting engagement record, stored as one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub status: ClientStatus,
    #[serde(default, with = "wire::blank_date")]
    pub contract_start: Option<NaiveDate>,
    #[serde(default, with = "wire::blank_date")]
    pub contract_end: Option<NaiveDate>,
    #[serde(default, with = "wire::blank_date")]
    pub last_meeting: Option<NaiveDate>,
    #[serde(default, with = "wire::blank_date")]
    pub next_meeting: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub meeting_logs: Vec<MeetingLog>,
    #[serde(default, with = "wire::loose_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Client {
    /// Creates a client with a generated id and no dates, tasks or logs.
    pub fn new(name: impl Into<String>, status: ClientStatus) -> Self {
        Self::with_id(Uuid::new_v4(), name, status)
    }

    /// Creates a client with a caller-provided id.
    pub fn with_id(id: ClientId, name: impl Into<String>, status: ClientStatus) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            contract_start: None,
            contract_end: None,
            last_meeting: None,
            next_meeting: None,
            tasks: Vec::new(),
            meeting_logs: Vec::new(),
            created_at: None,
        }
    }

    /// Checks record invariants before persistence and after reads.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.name.trim().is_empty() {
            return Err(ClientValidationError::BlankName);
        }

        let mut task_ids = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if !task_ids.insert(task.id) {
                return Err(ClientValidationError::DuplicateTaskId(task.id));
            }
        }

        let mut log_ids = HashSet::with_capacity(self.meeting_logs.len());
        for log in &self.meeting_logs {
            if !log_ids.insert(log.id) {
                return Err(ClientValidationError::DuplicateMeetingLogId(log.id));
            }
        }

        if let (Some(start), Some(end)) = (self.contract_start, self.contract_end) {
            if end < start {
                return Err(ClientValidationError::ContractRangeInverted { start, end });
            }
        }

        Ok(())
    }

    pub fn open_task_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    pub fn completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    /// Completed share of tasks in whole percent, `0` without tasks.
    pub fn progress_percent(&self) -> u8 {
        let total = self.tasks.len();
        if total == 0 {
            return 0;
        }
        let ratio = self.completed_task_count() as f64 / total as f64;
        (ratio * 100.0).round() as u8
    }

    /// Returns whether the next meeting is between today and three days out.
    pub fn is_meeting_soon(&self, today: NaiveDate) -> bool {
        self.next_meeting.is_some_and(|next| {
            let days = (next - today).num_days();
            (0..=MEETING_SOON_DAYS).contains(&days)
        })
    }

    /// Meeting logs ordered newest first.
    pub fn sorted_meeting_logs(&self) -> Vec<MeetingLog> {
        sorted_by_date_desc(&self.meeting_logs)
    }
}

/// Closed set of top-level fields that can be patched on a stored client.
///
/// Collection fields are always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientField {
    Name(String),
    Status(ClientStatus),
    ContractStart(Option<NaiveDate>),
    ContractEnd(Option<NaiveDate>),
    LastMeeting(Option<NaiveDate>),
    NextMeeting(Option<NaiveDate>),
    Tasks(Vec<Task>),
    MeetingLogs(Vec<MeetingLog>),
}

impl ClientField {
    /// Writes this field value into `client`.
    pub fn apply(&self, client: &mut Client) {
        match self {
            Self::Name(name) => client.name = name.clone(),
            Self::Status(status) => client.status = *status,
            Self::ContractStart(date) => client.contract_start = *date,
            Self::ContractEnd(date) => client.contract_end = *date,
            Self::LastMeeting(date) => client.last_meeting = *date,
            Self::NextMeeting(date) => client.next_meeting = *date,
            Self::Tasks(tasks) => client.tasks = tasks.clone(),
            Self::MeetingLogs(logs) => client.meeting_logs = logs.clone(),
        }
    }

    /// Stored document key, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Status(_) => "status",
            Self::ContractStart(_) => "contractStart",
            Self::ContractEnd(_) => "contractEnd",
            Self::LastMeeting(_) => "lastMeeting",
            Self::NextMeeting(_) => "nextMeeting",
            Self::Tasks(_) => "tasks",
            Self::MeetingLogs(_) => "meetingLogs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Client, ClientField, ClientStatus, ClientValidationError};
    use crate::model::task::Task;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn status_parses_wire_form_and_has_labels() {
        for status in ClientStatus::ALL {
            assert_eq!(status.as_str().parse::<ClientStatus>().unwrap(), status);
            assert!(!status.label().is_empty());
        }
        assert_eq!(" ACTIVE ".parse::<ClientStatus>().unwrap(), ClientStatus::Active);
        assert!(matches!(
            "archived".parse::<ClientStatus>(),
            Err(ClientValidationError::UnknownStatus(_))
        ));
    }

    #[test]
    fn progress_rounds_completed_share() {
        let mut client = Client::new("Acme", ClientStatus::Active);
        assert_eq!(client.progress_percent(), 0);

        let mut done = Task::new("done");
        done.completed = true;
        client.tasks = vec![done, Task::new("open"), Task::new("open too")];
        assert_eq!(client.progress_percent(), 33);
        assert_eq!(client.open_task_count(), 2);
        assert_eq!(client.completed_task_count(), 1);
    }

    #[test]
    fn validate_rejects_duplicate_task_ids() {
        let mut client = Client::new("Acme", ClientStatus::Active);
        let task = Task::new("twice");
        client.tasks = vec![task.clone(), task.clone()];
        assert_eq!(
            client.validate(),
            Err(ClientValidationError::DuplicateTaskId(task.id))
        );
    }

    #[test]
    fn field_patch_replaces_single_value() {
        let mut client = Client::new("Acme", ClientStatus::Onboarding);
        client.last_meeting = Some(day(1));

        let field = ClientField::NextMeeting(Some(day(12)));
        field.apply(&mut client);

        assert_eq!(field.name(), "nextMeeting");
        assert_eq!(client.next_meeting, Some(day(12)));
        assert_eq!(client.last_meeting, Some(day(1)));
    }
}
