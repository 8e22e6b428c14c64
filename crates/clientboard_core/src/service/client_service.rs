//! Client, task and meeting log use-case service.
//!
//! # Responsibility
//! - Create, patch, replace and delete client documents.
//! - Apply task and meeting log edits by rebuilding the owning client's
//!   collection and replacing the whole record.
//!
//! # Invariants
//! - Task and log edits locate the owner by id in the caller's snapshot.
//! - An edit touches exactly one client document.
//! - Nothing is written when validation fails.

use super::error::{ServiceError, ServiceResult};
use crate::model::client::{Client, ClientField, ClientId, ClientStatus};
use crate::model::meeting_log::{MeetingLog, MeetingLogDraft, MeetingLogId};
use crate::model::task::{Task, TaskField, TaskId};
use crate::repo::client_repo::ClientRepository;
use chrono::{DateTime, NaiveDate, Utc};
use log::info;

/// Input for registering a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub status: ClientStatus,
    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub last_meeting: Option<NaiveDate>,
    pub next_meeting: Option<NaiveDate>,
}

impl NewClient {
    /// New onboarding client with no dates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ClientStatus::Onboarding,
            contract_start: None,
            contract_end: None,
            last_meeting: None,
            next_meeting: None,
        }
    }
}

/// Use-case service over a client document repository.
pub struct ClientService<R: ClientRepository> {
    repo: R,
}

impl<R: ClientRepository> ClientService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a client with a fresh id and creation time.
    pub fn create_client(&self, input: NewClient) -> ServiceResult<Client> {
        let mut client = Client::new(input.name.trim(), input.status);
        client.contract_start = input.contract_start;
        client.contract_end = input.contract_end;
        client.last_meeting = input.last_meeting;
        client.next_meeting = input.next_meeting;
        client.created_at = Some(Utc::now());
        client.validate()?;

        self.repo.put_client(&client)?;
        info!(
            "event=client_create module=service status=ok client_id={}",
            client.id
        );
        Ok(client)
    }

    /// Overwrites one top-level field of a stored client.
    pub fn update_client_field(&self, id: ClientId, field: ClientField) -> ServiceResult<Client> {
        Ok(self.repo.patch_client(id, &[field])?)
    }

    pub fn delete_client(&self, id: ClientId) -> ServiceResult<()> {
        self.repo.delete_client(id)?;
        info!("event=client_delete module=service status=ok client_id={id}");
        Ok(())
    }

    /// Appends an incomplete task typed by the user.
    pub fn add_task(
        &self,
        clients: &[Client],
        client_id: ClientId,
        text: &str,
    ) -> ServiceResult<Client> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::BlankTaskText);
        }
        self.edit_client(clients, client_id, |client| {
            client.tasks.push(Task::new(text));
            Ok(())
        })
    }

    /// Flips completion of one task.
    pub fn toggle_task(
        &self,
        clients: &[Client],
        client_id: ClientId,
        task_id: TaskId,
    ) -> ServiceResult<Client> {
        self.edit_client(clients, client_id, |client| {
            task_mut(client, task_id)?.toggle();
            Ok(())
        })
    }

    /// Overwrites one field of one task.
    pub fn update_task_field(
        &self,
        clients: &[Client],
        client_id: ClientId,
        task_id: TaskId,
        field: TaskField,
    ) -> ServiceResult<Client> {
        if matches!(&field, TaskField::Text(text) if text.trim().is_empty()) {
            return Err(ServiceError::BlankTaskText);
        }
        self.edit_client(clients, client_id, |client| {
            field.apply(task_mut(client, task_id)?);
            Ok(())
        })
    }

    /// Removes exactly one task from its owning client.
    pub fn delete_task(
        &self,
        clients: &[Client],
        client_id: ClientId,
        task_id: TaskId,
    ) -> ServiceResult<Client> {
        self.edit_client(clients, client_id, |client| {
            let index = task_index(client, task_id)?;
            client.tasks.remove(index);
            Ok(())
        })
    }

    /// Creates a new log or edits an existing one from `draft`.
    pub fn save_meeting_log(
        &self,
        clients: &[Client],
        client_id: ClientId,
        draft: MeetingLogDraft,
    ) -> ServiceResult<Client> {
        if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
            return Err(ServiceError::IncompleteMeetingLog);
        }
        self.edit_client(clients, client_id, |client| {
            upsert_meeting_log(client, draft, Utc::now()).map(|_| ())
        })
    }

    pub fn delete_meeting_log(
        &self,
        clients: &[Client],
        client_id: ClientId,
        log_id: MeetingLogId,
    ) -> ServiceResult<Client> {
        self.edit_client(clients, client_id, |client| {
            let index = client
                .meeting_logs
                .iter()
                .position(|log| log.id == log_id)
                .ok_or(ServiceError::MeetingLogNotFound { client_id, log_id })?;
            client.meeting_logs.remove(index);
            Ok(())
        })
    }

    fn edit_client(
        &self,
        clients: &[Client],
        client_id: ClientId,
        edit: impl FnOnce(&mut Client) -> ServiceResult<()>,
    ) -> ServiceResult<Client> {
        let mut updated = find_client(clients, client_id)?.clone();
        edit(&mut updated)?;
        self.repo.put_client(&updated)?;
        Ok(updated)
    }
}

/// Looks up the owner of a task or log in a snapshot.
pub fn find_client(clients: &[Client], client_id: ClientId) -> ServiceResult<&Client> {
    clients
        .iter()
        .find(|client| client.id == client_id)
        .ok_or(ServiceError::ClientNotFound(client_id))
}

/// Inserts a new log or replaces the one with the draft's id.
pub(crate) fn upsert_meeting_log(
    client: &mut Client,
    draft: MeetingLogDraft,
    now: DateTime<Utc>,
) -> ServiceResult<MeetingLog> {
    let client_id = client.id;
    let log = match draft.id {
        Some(log_id) => {
            let slot = client
                .meeting_logs
                .iter_mut()
                .find(|log| log.id == log_id)
                .ok_or(ServiceError::MeetingLogNotFound { client_id, log_id })?;
            *slot = draft.into_log(now);
            slot.clone()
        }
        None => {
            let log = draft.into_log(now);
            client.meeting_logs.push(log.clone());
            log
        }
    };
    Ok(log)
}

fn task_index(client: &Client, task_id: TaskId) -> ServiceResult<usize> {
    client
        .tasks
        .iter()
        .position(|task| task.id == task_id)
        .ok_or(ServiceError::TaskNotFound {
            client_id: client.id,
            task_id,
        })
}

fn task_mut(client: &mut Client, task_id: TaskId) -> ServiceResult<&mut Task> {
    let index = task_index(client, task_id)?;
    Ok(&mut client.tasks[index])
}
