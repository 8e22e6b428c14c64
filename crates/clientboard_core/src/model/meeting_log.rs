//! Meeting log domain model.
//!
//! # Responsibility
//! - Define stored meeting records and the editable draft used to create or
//!   edit them.
//!
//! # Invariants
//! - `id` is unique within the owning client's log list.
//! - A saved log always has a non-blank title and content.

use super::wire;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a meeting log inside its owning client.
pub type MeetingLogId = Uuid;

/// Stored record of a past meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingLog {
    pub id: MeetingLogId,
    #[serde(default, with = "wire::blank_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, with = "wire::loose_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Editable meeting log form state.
///
/// `id == None` means the draft creates a new log on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingLogDraft {
    pub id: Option<MeetingLogId>,
    pub date: Option<NaiveDate>,
    pub title: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl MeetingLogDraft {
    /// Empty draft dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            id: None,
            date: Some(today),
            title: String::new(),
            content: String::new(),
            created_at: None,
        }
    }

    /// Draft that edits an existing log in place.
    pub fn from_log(log: &MeetingLog) -> Self {
        Self {
            id: Some(log.id),
            date: log.date,
            title: log.title.clone(),
            content: log.content.clone(),
            created_at: log.created_at,
        }
    }

    /// Appends transcribed text, separated from existing content by a blank line.
    pub fn append_content(&mut self, text: &str) {
        if !self.content.is_empty() {
            self.content.push_str("\n\n");
        }
        self.content.push_str(text);
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Builds the stored log, assigning identity and creation time when new.
    pub fn into_log(self, now: DateTime<Utc>) -> MeetingLog {
        MeetingLog {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            date: self.date,
            title: self.title,
            content: self.content,
            created_at: Some(self.created_at.unwrap_or(now)),
        }
    }
}

/// Returns logs ordered by meeting date, newest first. Undated logs go last.
pub fn sorted_by_date_desc(logs: &[MeetingLog]) -> Vec<MeetingLog> {
    let mut sorted = logs.to_vec();
    sorted.sort_by(|a, b| match (a.date, b.date) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted
}
