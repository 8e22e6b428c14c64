//! Service-level error types.

use crate::ai::prompts::PromptError;
use crate::ai::AiError;
use crate::model::client::{ClientId, ClientValidationError};
use crate::model::meeting_log::MeetingLogId;
use crate::model::task::TaskId;
use crate::repo::client_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from client, task and meeting log use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ClientValidationError),
    /// Task text is blank after trim.
    BlankTaskText,
    /// Meeting log title or content is blank after trim.
    IncompleteMeetingLog,
    ClientNotFound(ClientId),
    TaskNotFound {
        client_id: ClientId,
        task_id: TaskId,
    },
    MeetingLogNotFound {
        client_id: ClientId,
        log_id: MeetingLogId,
    },
    /// Store read or write failure.
    Store(RepoError),
}

impl ServiceError {
    /// Short message suitable for an alert.
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::Validation(ClientValidationError::BlankName) => "Please enter a client name.",
            Self::Validation(_) => "The client details are not valid.",
            Self::BlankTaskText => "Please enter the task text.",
            Self::IncompleteMeetingLog => "Please enter both a title and the meeting content.",
            Self::ClientNotFound(_) => "This client no longer exists.",
            Self::TaskNotFound { .. } => "This task no longer exists.",
            Self::MeetingLogNotFound { .. } => "This meeting log no longer exists.",
            Self::Store(_) => "Saving failed. Please check the database connection and permissions.",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::BlankTaskText => write!(f, "task text must not be blank"),
            Self::IncompleteMeetingLog => {
                write!(f, "meeting log title and content must not be blank")
            }
            Self::ClientNotFound(id) => write!(f, "client not found: {id}"),
            Self::TaskNotFound { client_id, task_id } => {
                write!(f, "task {task_id} not found in client {client_id}")
            }
            Self::MeetingLogNotFound { client_id, log_id } => {
                write!(f, "meeting log {log_id} not found in client {client_id}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClientValidationError> for ServiceError {
    fn from(value: ClientValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ClientNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// Errors from AI-assisted flows. None of them leave partial state behind.
#[derive(Debug)]
pub enum AssistantError {
    /// The service produced no usable text.
    GenerationFailed(AiError),
    /// The text was not the expected JSON string array.
    MalformedResponse(PromptError),
    /// The file could not be read or transcribed.
    TranscriptionFailed(String),
    /// Applying the result to the store failed.
    Service(ServiceError),
}

impl AssistantError {
    /// Short message suitable for an alert.
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::GenerationFailed(_) | Self::MalformedResponse(_) => {
                "Generating tasks failed. Please try again."
            }
            Self::TranscriptionFailed(_) => "Reading the file failed.",
            Self::Service(err) => err.user_notice(),
        }
    }
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GenerationFailed(err) => write!(f, "generation failed: {err}"),
            Self::MalformedResponse(err) => write!(f, "malformed AI response: {err}"),
            Self::TranscriptionFailed(message) => write!(f, "transcription failed: {message}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssistantError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::GenerationFailed(err) => Some(err),
            Self::MalformedResponse(err) => Some(err),
            Self::TranscriptionFailed(_) => None,
            Self::Service(err) => Some(err),
        }
    }
}

impl From<ServiceError> for AssistantError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<RepoError> for AssistantError {
    fn from(value: RepoError) -> Self {
        Self::Service(value.into())
    }
}
