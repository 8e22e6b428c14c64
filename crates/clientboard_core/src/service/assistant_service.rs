//! AI-assisted use-cases.
//!
//! # Responsibility
//! - Draft meeting agendas, suggest tasks and extract tasks from meeting logs.
//! - Transcribe uploaded files into a meeting log draft.
//!
//! # Invariants
//! - A failed or malformed generation never writes to the store.
//! - Extraction saves the log and the new tasks in a single patch.
//! - Each call is one request; nothing is retried.

use super::client_service::upsert_meeting_log;
use super::error::{AssistantError, ServiceError};
use crate::ai::prompts::{
    agenda_prompt, extraction_prompt, parse_task_list, suggestion_prompt, TRANSCRIPTION_PROMPT,
};
use crate::ai::{AiError, InlineAttachment, TextGenerator};
use crate::model::client::{Client, ClientField};
use crate::model::meeting_log::{MeetingLog, MeetingLogDraft};
use crate::model::task::Task;
use crate::repo::client_repo::ClientRepository;
use chrono::Utc;
use log::{error, info, warn};
use std::path::Path;

/// Shown in place of an agenda when generation fails.
pub const AGENDA_FAILED_PLACEHOLDER: &str = "Generation failed. Please try again.";

/// Agenda text ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agenda {
    pub text: String,
    /// `false` when `text` is the failure placeholder.
    pub generated: bool,
}

/// Result of saving a meeting log together with extracted tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub client: Client,
    pub log: MeetingLog,
    pub extracted: usize,
}

/// AI-assisted flows over a client repository and a text generator.
pub struct AssistantService<R: ClientRepository, G: TextGenerator> {
    repo: R,
    generator: G,
}

impl<R: ClientRepository, G: TextGenerator> AssistantService<R, G> {
    pub fn new(repo: R, generator: G) -> Self {
        Self { repo, generator }
    }

    /// Drafts the next meeting agenda. Failure yields the placeholder text.
    pub fn generate_agenda(&self, client: &Client) -> Agenda {
        match self.generate_text(&agenda_prompt(client), None) {
            Ok(text) => {
                info!(
                    "event=agenda_generate module=service status=ok client_id={}",
                    client.id
                );
                Agenda {
                    text,
                    generated: true,
                }
            }
            Err(err) => {
                error!(
                    "event=agenda_generate module=service status=error client_id={} error={}",
                    client.id, err
                );
                Agenda {
                    text: AGENDA_FAILED_PLACEHOLDER.to_string(),
                    generated: false,
                }
            }
        }
    }

    /// Appends AI-suggested next tasks to the client's task list.
    pub fn suggest_tasks(&self, client: &Client) -> Result<Client, AssistantError> {
        let suggestions = self.generate_task_list(&suggestion_prompt(client), "suggest")?;

        let mut tasks = client.tasks.clone();
        tasks.extend(suggestions.into_iter().map(Task::new));
        let updated = self
            .repo
            .patch_client(client.id, &[ClientField::Tasks(tasks)])?;

        info!(
            "event=task_suggest module=service status=ok client_id={} task_count={}",
            client.id,
            updated.tasks.len()
        );
        Ok(updated)
    }

    /// Saves `draft` and appends the action items extracted from its content.
    pub fn extract_and_save(
        &self,
        client: &Client,
        draft: MeetingLogDraft,
    ) -> Result<ExtractionOutcome, AssistantError> {
        if draft.content.trim().is_empty() {
            return Err(ServiceError::IncompleteMeetingLog.into());
        }

        let extracted = self.generate_task_list(&extraction_prompt(&draft.content), "extract")?;
        let extracted_count = extracted.len();

        let mut staged = client.clone();
        let log = upsert_meeting_log(&mut staged, draft, Utc::now())?;
        staged.tasks.extend(extracted.into_iter().map(Task::new));

        let updated = self.repo.patch_client(
            client.id,
            &[
                ClientField::MeetingLogs(staged.meeting_logs),
                ClientField::Tasks(staged.tasks),
            ],
        )?;

        info!(
            "event=task_extract module=service status=ok client_id={} log_id={} extracted={}",
            client.id, log.id, extracted_count
        );
        Ok(ExtractionOutcome {
            client: updated,
            log,
            extracted: extracted_count,
        })
    }

    /// Transcribes `attachment` and appends the text to the draft content.
    ///
    /// The draft is left unchanged on failure.
    pub fn transcribe_into_draft(
        &self,
        draft: &mut MeetingLogDraft,
        attachment: &InlineAttachment,
    ) -> Result<(), AssistantError> {
        match self.generate_text(TRANSCRIPTION_PROMPT, Some(attachment)) {
            Ok(text) => {
                draft.append_content(text.trim());
                info!(
                    "event=file_transcribe module=service status=ok mime_type={}",
                    attachment.mime_type
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=file_transcribe module=service status=error mime_type={} error={}",
                    attachment.mime_type, err
                );
                Err(AssistantError::TranscriptionFailed(err.to_string()))
            }
        }
    }

    /// Reads a file from disk and transcribes it into the draft.
    pub fn transcribe_file(
        &self,
        draft: &mut MeetingLogDraft,
        path: impl AsRef<Path>,
    ) -> Result<(), AssistantError> {
        let attachment = InlineAttachment::from_path(path).map_err(|err| {
            warn!("event=file_transcribe module=service status=error error_code=file_read_failed error={err}");
            AssistantError::TranscriptionFailed(err.to_string())
        })?;
        self.transcribe_into_draft(draft, &attachment)
    }

    fn generate_text(
        &self,
        prompt: &str,
        attachment: Option<&InlineAttachment>,
    ) -> Result<String, AiError> {
        let text = self.generator.generate(prompt, attachment)?;
        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }

    fn generate_task_list(
        &self,
        prompt: &str,
        flow: &'static str,
    ) -> Result<Vec<String>, AssistantError> {
        let text = self.generate_text(prompt, None).map_err(|err| {
            error!("event=task_{flow} module=service status=error error_code=generation_failed error={err}");
            AssistantError::GenerationFailed(err)
        })?;

        parse_task_list(&text).map_err(|err| {
            error!("event=task_{flow} module=service status=error error_code=malformed_response error={err}");
            AssistantError::MalformedResponse(err)
        })
    }
}
