//! File-to-payload encoding for AI requests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Binary payload sent inline with a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAttachment {
    pub mime_type: String,
    /// Standard base64 without a data-URL prefix.
    pub data: String,
}

impl InlineAttachment {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Reads `path` and infers the media type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(mime_type_for_path(path), &bytes))
    }
}

/// Media type for the file extensions accepted by the transcription flow.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        _ => FALLBACK_MIME_TYPE,
    }
}
