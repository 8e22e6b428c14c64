//! Client list projection and dashboard counters.
//!
//! # Responsibility
//! - Filter and sort the client snapshot for the dashboard grid.
//! - Compute aggregate counters from the unfiltered snapshot.
//!
//! # Invariants
//! - Projections never mutate their input.
//! - Sorting is stable; ties keep snapshot order.
//! - Undated clients always trail dated ones under `SortKey::NextMeeting`.

use crate::model::client::{Client, ClientStatus, ClientValidationError};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::cmp::{Ordering, Reverse};
use std::str::FromStr;

/// Window in which a next meeting counts as upcoming.
const UPCOMING_MEETING_WINDOW_DAYS: i64 = 7;

/// Status selection for the dashboard grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ClientStatus),
}

impl StatusFilter {
    pub fn matches(self, status: ClientStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ClientValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value.parse().map(Self::Only)
    }
}

/// Dashboard ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Earliest next meeting first, undated last.
    #[default]
    NextMeeting,
    /// Most incomplete tasks first.
    OpenTaskCount,
    /// Newest first, missing timestamps last.
    CreatedAt,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "next_meeting" | "next-meeting" | "nextmeeting" => Ok(Self::NextMeeting),
            "open_tasks" | "open-tasks" | "task_priority" | "taskpriority" => {
                Ok(Self::OpenTaskCount)
            }
            "created" | "created_at" | "created-at" => Ok(Self::CreatedAt),
            other => Err(format!(
                "unsupported sort key `{other}`; expected next_meeting|open_tasks|created"
            )),
        }
    }
}

/// User-selected dashboard filter state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientQuery {
    /// Case-insensitive substring of the client name. Blank matches all.
    pub search: String,
    pub status: StatusFilter,
    pub sort: SortKey,
}

/// Aggregate counters shown next to the client grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_clients: usize,
    /// Incomplete tasks summed over all clients.
    pub pending_tasks: usize,
    /// Clients whose next meeting falls in `[now, now + 7 days)`.
    pub upcoming_meetings: usize,
}

/// Returns the filtered, sorted client list for `query`.
pub fn project_clients(clients: &[Client], query: &ClientQuery) -> Vec<Client> {
    let needle = query.search.trim().to_lowercase();
    let mut result: Vec<Client> = clients
        .iter()
        .filter(|client| needle.is_empty() || client.name.to_lowercase().contains(&needle))
        .filter(|client| query.status.matches(client.status))
        .cloned()
        .collect();

    sort_clients(&mut result, query.sort);
    result
}

/// Sorts `clients` in place by `key`.
pub fn sort_clients(clients: &mut [Client], key: SortKey) {
    match key {
        SortKey::CreatedAt => clients.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::NextMeeting => {
            clients.sort_by(|a, b| match (a.next_meeting, b.next_meeting) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
        }
        SortKey::OpenTaskCount => clients.sort_by_key(|client| Reverse(client.open_task_count())),
    }
}

/// Computes dashboard counters over the unfiltered snapshot.
///
/// A next meeting is taken to start at 00:00 UTC on its date.
pub fn compute_stats(clients: &[Client], now: DateTime<Utc>) -> DashboardStats {
    let window = Duration::days(UPCOMING_MEETING_WINDOW_DAYS);
    let upcoming_meetings = clients
        .iter()
        .filter_map(|client| client.next_meeting)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc() - now)
        .filter(|until| *until >= Duration::zero() && *until < window)
        .count();

    DashboardStats {
        total_clients: clients.len(),
        pending_tasks: clients.iter().map(Client::open_task_count).sum(),
        upcoming_meetings,
    }
}

#[cfg(test)]
mod tests {
    use super::{SortKey, StatusFilter};
    use crate::model::client::ClientStatus;

    #[test]
    fn status_filter_parses_all_and_statuses() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Active".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(ClientStatus::Active)
        );
        assert!("archived".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn sort_key_accepts_known_aliases() {
        assert_eq!("nextMeeting".parse::<SortKey>().unwrap(), SortKey::NextMeeting);
        assert_eq!("taskPriority".parse::<SortKey>().unwrap(), SortKey::OpenTaskCount);
        assert_eq!("created".parse::<SortKey>().unwrap(), SortKey::CreatedAt);
        assert!("alphabetical".parse::<SortKey>().is_err());
    }
}
