//! Generative text service boundary.
//!
//! # Responsibility
//! - Define the one-shot text generation contract used by the assistant.
//! - Compose prompts and parse structured responses.
//! - Encode uploaded files as inline attachments.
//!
//! # Invariants
//! - Every call is independent: no streaming, no conversation state.
//! - An empty response is an error, never a successful empty string.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod attachment;
pub mod gemini;
pub mod prompts;

pub use attachment::InlineAttachment;
pub use gemini::GeminiClient;

pub type AiResult<T> = Result<T, AiError>;

/// Failure of one generation request.
#[derive(Debug)]
pub enum AiError {
    /// No API key configured.
    MissingApiKey,
    /// Request could not be built or sent.
    Transport(String),
    /// Service answered with a non-success status.
    Status { code: u16, body: String },
    /// Service answered but produced no text.
    EmptyResponse,
    /// Response body did not match the expected envelope.
    InvalidResponse(String),
}

impl Display for AiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "AI API key is not configured"),
            Self::Transport(message) => write!(f, "AI request failed: {message}"),
            Self::Status { code, body } => write!(f, "AI service returned {code}: {body}"),
            Self::EmptyResponse => write!(f, "AI service returned no text"),
            Self::InvalidResponse(message) => write!(f, "invalid AI response: {message}"),
        }
    }
}

impl Error for AiError {}

/// One-shot text generation service.
pub trait TextGenerator {
    /// Generates text for `prompt`, optionally with one inline file.
    fn generate(&self, prompt: &str, attachment: Option<&InlineAttachment>) -> AiResult<String>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, prompt: &str, attachment: Option<&InlineAttachment>) -> AiResult<String> {
        (**self).generate(prompt, attachment)
    }
}
