//! Core domain logic for ClientBoard.
//! This crate is the single source of truth for client engagement invariants.

pub mod ai;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod state;
pub mod sync;
pub mod view;

pub use ai::{AiError, GeminiClient, InlineAttachment, TextGenerator};
pub use config::{AiConfig, AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::client::{Client, ClientField, ClientId, ClientStatus, ClientValidationError};
pub use model::meeting_log::{MeetingLog, MeetingLogDraft, MeetingLogId};
pub use model::task::{Task, TaskField, TaskId};
pub use repo::client_repo::{ClientRepository, RepoError, RepoResult, SqliteClientRepository};
pub use service::assistant_service::{Agenda, AssistantService, ExtractionOutcome};
pub use service::client_service::{ClientService, NewClient};
pub use service::error::{AssistantError, ServiceError, ServiceResult};
pub use state::{attach_dashboard, DashboardState, SharedDashboard};
pub use sync::{ClientStore, Snapshot, Subscription};
pub use view::dashboard::{ClientQuery, DashboardStats, SortKey, StatusFilter};
pub use view::task_board::{AssigneeFilter, CompletionFilter, TaskQuery, TaskRow};
