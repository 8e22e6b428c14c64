//! Generative Language REST client.
//!
//! Uses blocking reqwest with the API key in the `x-goog-api-key` header.
//! Requests target `{endpoint}/models/{model}:generateContent`.

use super::{AiError, AiResult, InlineAttachment, TextGenerator};
use crate::config::AiConfig;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: RequestInlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Text generator backed by the Generative Language API.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> AiResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| AiError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn send(&self, api_key: &str, body: &GenerateRequest<'_>) -> AiResult<String> {
        let response = self
            .http
            .post(self.url())
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .map_err(|err| AiError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(AiError::Status {
                code: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|err| AiError::InvalidResponse(err.to_string()))?;
        extract_text(parsed)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str, attachment: Option<&InlineAttachment>) -> AiResult<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("event=ai_generate module=ai status=error error_code=missing_api_key");
            return Err(AiError::MissingApiKey);
        };

        let started_at = Instant::now();
        info!(
            "event=ai_generate module=ai status=start model={} prompt_chars={} attachment={}",
            self.model,
            prompt.chars().count(),
            attachment.map_or("none", |file| file.mime_type.as_str())
        );

        let body = build_request(prompt, attachment);
        match self.send(api_key, &body) {
            Ok(text) => {
                info!(
                    "event=ai_generate module=ai status=ok model={} duration_ms={} response_chars={}",
                    self.model,
                    started_at.elapsed().as_millis(),
                    text.chars().count()
                );
                Ok(text)
            }
            Err(err) => {
                error!(
                    "event=ai_generate module=ai status=error model={} duration_ms={} error={}",
                    self.model,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn build_request<'a>(
    prompt: &'a str,
    attachment: Option<&'a InlineAttachment>,
) -> GenerateRequest<'a> {
    let mut parts = vec![RequestPart::Text { text: prompt }];
    if let Some(file) = attachment {
        parts.push(RequestPart::Inline {
            inline_data: RequestInlineData {
                mime_type: &file.mime_type,
                data: &file.data,
            },
        });
    }
    GenerateRequest {
        contents: vec![RequestContent { parts }],
    }
}

fn extract_text(response: GenerateResponse) -> AiResult<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::{build_request, extract_text, GeminiClient, GenerateResponse};
    use crate::ai::{AiError, InlineAttachment, TextGenerator};
    use crate::config::AiConfig;

    #[test]
    fn request_carries_text_then_inline_data() {
        let attachment = InlineAttachment::from_bytes("application/pdf", b"%PDF");
        let body = serde_json::to_value(build_request("transcribe", Some(&attachment))).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "transcribe");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[1]["inlineData"]["data"], attachment.data.as_str());
    }

    #[test]
    fn response_parts_are_concatenated() {
        let response: GenerateResponse = serde_json::from_str(
            r###"{"candidates":[{"content":{"parts":[{"text":"## Agenda"},{"text":"\n1. Review"}]}}]}"###,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "## Agenda\n1. Review");
    }

    #[test]
    fn missing_candidates_is_empty_response() {
        let response: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(matches!(extract_text(response), Err(AiError::EmptyResponse)));
    }

    #[test]
    fn missing_api_key_fails_without_network() {
        let client = GeminiClient::new(&AiConfig::default()).unwrap();
        let err = client.generate("hello", None).unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey));
    }
}
