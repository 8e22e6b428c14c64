//! Prompt composition and response parsing for assistant flows.
//!
//! # Responsibility
//! - Build agenda, task suggestion, task extraction and transcription prompts
//!   from client state.
//! - Parse the JSON string-array responses of suggestion and extraction.
//!
//! # Invariants
//! - Only incomplete tasks are listed in the agenda prompt.
//! - Code-fence markers are removed before JSON parsing.

use crate::model::client::Client;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of tasks requested from the suggestion prompt.
pub const SUGGESTED_TASK_COUNT: usize = 3;

const UNASSIGNED_PLACEHOLDER: &str = "unassigned";
const NO_OPEN_TASKS_PLACEHOLDER: &str = "none";

/// Instruction sent together with an uploaded file.
pub const TRANSCRIPTION_PROMPT: &str = "Read the attached file (PDF, image, text or similar) \
and transcribe its content as meeting minutes. Do not summarize: keep as much detail as \
possible. Use headings and bullet points so the result is easy to read.";

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?").expect("valid code fence regex"));

/// Response could not be read as a JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    InvalidJson(String),
    NotAnArray,
    NonStringItem(usize),
}

impl Display for PromptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(message) => write!(f, "response is not valid JSON: {message}"),
            Self::NotAnArray => write!(f, "response JSON is not an array"),
            Self::NonStringItem(index) => {
                write!(f, "response array item {index} is not a string")
            }
        }
    }
}

impl Error for PromptError {}

/// Builds the meeting agenda instruction for `client`.
pub fn agenda_prompt(client: &Client) -> String {
    let open_tasks: Vec<String> = client
        .tasks
        .iter()
        .filter(|task| !task.completed)
        .map(|task| {
            format!(
                "- {} ({})",
                task.text,
                task.assignee.as_deref().unwrap_or(UNASSIGNED_PLACEHOLDER)
            )
        })
        .collect();
    let open_tasks = if open_tasks.is_empty() {
        NO_OPEN_TASKS_PLACEHOLDER.to_string()
    } else {
        open_tasks.join("\n")
    };

    format!(
        "You are an experienced project manager at an AI consulting firm.\n\
         Draft the agenda for the next regular meeting with the client \"{name}\".\n\
         \n\
         [Situation]\n\
         - Status: {status}\n\
         - Open tasks:\n\
         {open_tasks}\n\
         \n\
         [Output format]\n\
         Answer concisely in exactly the format below. No greeting.\n\
         \n\
         ## {name} regular meeting agenda\n\
         \n\
         1. [Topic 1]\n\
         2. [Topic 2]\n\
         3. ...\n\
         \n\
         ### Points to confirm\n\
         - [Point 1]\n\
         - [Point 2]\n",
        name = client.name,
        status = client.status,
    )
}

/// Builds the instruction asking for next-step task suggestions.
pub fn suggestion_prompt(client: &Client) -> String {
    format!(
        "You are an assistant to an AI consultant.\n\
         The client \"{name}\" currently has the status \"{status}\".\n\
         Propose exactly {count} concrete next tasks for this client, each as one short sentence.\n\
         Return only a JSON array. Example: [\"Task 1\", \"Task 2\", \"Task 3\"]\n\
         Do not add markdown or any explanation.\n",
        name = client.name,
        status = client.status,
        count = SUGGESTED_TASK_COUNT,
    )
}

/// Builds the instruction extracting action items from meeting content.
pub fn extraction_prompt(meeting_content: &str) -> String {
    format!(
        "You are an AI consultant.\n\
         From the meeting minutes below, extract the next actions (to-dos) that either our \
         consulting team or the client must carry out, and output them as a JSON array of \
         short texts.\n\
         \n\
         [Minutes]\n\
         {meeting_content}\n\
         \n\
         [Example output]\n\
         [\"Schedule the regular meeting\", \"Issue accounts\", \"Revise the kickoff deck\"]\n\
         \n\
         Note: return only the pure JSON array, without explanations or markdown.\n"
    )
}

/// Removes every ```` ```json ```` and ```` ``` ```` marker and trims.
pub fn strip_code_fences(response: &str) -> String {
    CODE_FENCE_RE.replace_all(response, "").trim().to_string()
}

/// Parses a response expected to hold a JSON array of strings.
///
/// Items are trimmed and blank items dropped.
pub fn parse_task_list(response: &str) -> Result<Vec<String>, PromptError> {
    let cleaned = strip_code_fences(response);
    let value: serde_json::Value = serde_json::from_str(&cleaned)
        .map_err(|err| PromptError::InvalidJson(err.to_string()))?;

    let items = value.as_array().ok_or(PromptError::NotAnArray)?;
    let mut tasks = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let text = item.as_str().ok_or(PromptError::NonStringItem(index))?;
        let text = text.trim();
        if !text.is_empty() {
            tasks.push(text.to_string());
        }
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::{
        agenda_prompt, extraction_prompt, parse_task_list, strip_code_fences, suggestion_prompt,
        PromptError,
    };
    use crate::model::client::{Client, ClientStatus};
    use crate::model::task::Task;

    #[test]
    fn agenda_lists_only_open_tasks_with_assignee_fallback() {
        let mut client = Client::new("Acme Corp", ClientStatus::Active);
        let mut owned = Task::new("prepare proposal");
        owned.assignee = Some("Mori".to_string());
        let mut done = Task::new("sign NDA");
        done.completed = true;
        client.tasks = vec![owned, Task::new("book venue"), done];

        let prompt = agenda_prompt(&client);
        assert!(prompt.contains("\"Acme Corp\""));
        assert!(prompt.contains("- Status: active"));
        assert!(prompt.contains("- prepare proposal (Mori)"));
        assert!(prompt.contains("- book venue (unassigned)"));
        assert!(!prompt.contains("sign NDA"));
        assert!(prompt.contains("## Acme Corp regular meeting agenda"));
    }

    #[test]
    fn agenda_without_open_tasks_says_none() {
        let client = Client::new("Quiet LLC", ClientStatus::Pending);
        assert!(agenda_prompt(&client).contains("- Open tasks:\nnone\n"));
    }

    #[test]
    fn suggestion_and_extraction_prompts_embed_inputs() {
        let client = Client::new("Beta Inc", ClientStatus::Onboarding);
        let prompt = suggestion_prompt(&client);
        assert!(prompt.contains("status \"onboarding\""));
        assert!(prompt.contains("exactly 3"));

        let prompt = extraction_prompt("Agreed to send the invoice by Friday.");
        assert!(prompt.contains("Agreed to send the invoice by Friday."));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn fences_are_stripped_before_parsing() {
        assert_eq!(strip_code_fences("```json\n[\"a\"]\n```"), "[\"a\"]");
        let tasks = parse_task_list("```json\n[\"call client\", \"send invoice\"]\n```").unwrap();
        assert_eq!(tasks, vec!["call client", "send invoice"]);
    }

    #[test]
    fn non_array_responses_are_rejected() {
        assert!(matches!(
            parse_task_list("Sorry, I cannot help"),
            Err(PromptError::InvalidJson(_))
        ));
        assert_eq!(parse_task_list("{\"tasks\":[]}"), Err(PromptError::NotAnArray));
        assert_eq!(parse_task_list("[\"ok\", 3]"), Err(PromptError::NonStringItem(1)));
    }

    #[test]
    fn blank_items_are_dropped() {
        assert_eq!(parse_task_list("[\" a \", \"  \"]").unwrap(), vec!["a"]);
    }
}
