//! Client for an OpenAI-compatible chat-completions endpoint that proposes
//! project layouts as tree drawings.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::normalize::TREE_GLYPHS;

/// Anything that can turn a project description into raw layout text.
pub trait LayoutSource {
    fn propose_layout(&self, description: &str) -> Result<String, LlmError>;
}

const INSTRUCTIONS: &str = r#"You are a helpful coding assistant. Based on the following prompt, generate a well structured file and folder layout in a proper tree format with connecting lines.

Please follow these strict formatting rules:
1.  The root of the project should be explicitly named if the user's prompt implies a project name (e.g., "project-name/").
2.  Use proper tree characters: '├──' for items that have siblings below them, '└──' for the last item in a directory.
3.  Use vertical bars '│' for directory indentation.
4.  Use 4 spaces for each level of indentation.
5.  ALWAYS use a trailing slash "/" for directory names (e.g., "folder1/", "subfolder/").
6.  Do NOT use a trailing slash for file names (e.g., "file1.js", "README.md").
7.  Ensure consistent spacing and format like this example:
my-project/
├── src/
│   ├── main.rs
│   └── utils/
│       └── helpers.rs
├── tests/
│   └── integration.rs
├── .gitignore
└── README.md

IMPORTANT: ONLY return the tree structure. Do not include any explanations, introductions, or notes. Do not use backticks or any other markdown formatting around the tree."#;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A```(?:(.*)```)?\z").expect("fence pattern is valid")
});

/// Full prompt sent for a user's project description.
pub fn build_prompt(description: &str) -> String {
    format!("{INSTRUCTIONS}\n\nPrompt: {description}")
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct ChatClient {
    http: reqwest::blocking::Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::MissingCredentials("GROQ_API_KEY"));
        }
        if config.model.is_empty() {
            return Err(LlmError::MissingCredentials("MODEL"));
        }
        Ok(ChatClient {
            http: reqwest::blocking::Client::new(),
            config,
        })
    }
}

impl LayoutSource for ChatClient {
    fn propose_layout(&self, description: &str) -> Result<String, LlmError> {
        let prompt = build_prompt(description);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.config.temperature,
        };

        debug!(url = %self.config.api_url, model = %self.config.model, "sending layout request");
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(LlmError::Status {
                code: status.as_u16(),
                body,
            });
        }

        extract_content(&body)
    }
}

/// Pull the first choice's message text out of a chat-completions body.
pub fn extract_content(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body)?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(LlmError::EmptyResponse)?;
    Ok(strip_code_fence(&content))
}

/// Remove a surrounding markdown fence and its short info string, if any.
pub fn strip_code_fence(content: &str) -> String {
    let content = content.trim();
    let Some(caps) = FENCE.captures(content) else {
        return content.to_string();
    };
    // A lone fence has nothing inside it.
    let inner = caps.get(1).map_or("", |m| m.as_str());
    if let Some((first, rest)) = inner.split_once('\n') {
        let first = first.trim();
        let is_info_string = !first.is_empty()
            && first.chars().count() < 15
            && !first.contains(TREE_GLYPHS)
            && !first.contains(['/', '.']);
        if is_info_string {
            return rest.trim().to_string();
        }
    }
    inner.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ends_with_description() {
        let prompt = build_prompt("a rust cli");
        assert!(prompt.ends_with("Prompt: a rust cli"));
        assert!(prompt.contains("└──"));
    }

    #[test]
    fn extracts_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  app/\n└── a.txt  "}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "app/\n└── a.txt");
    }

    #[test]
    fn missing_choices_is_empty_response() {
        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            extract_content(r#"{"id":"x"}"#),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn invalid_json_is_decode_error() {
        assert!(matches!(extract_content("nope"), Err(LlmError::Decode(_))));
    }

    #[test]
    fn strips_fence_with_language_tag() {
        let fenced = "```text\napp/\n└── a.txt\n```";
        assert_eq!(strip_code_fence(fenced), "app/\n└── a.txt");
    }

    #[test]
    fn keeps_root_line_after_bare_fence() {
        let fenced = "```\napp/\n└── a.txt\n```";
        assert_eq!(strip_code_fence(fenced), "app/\n└── a.txt");
    }

    #[test]
    fn lone_fence_is_empty() {
        assert_eq!(strip_code_fence("```"), "");
        assert_eq!(strip_code_fence("  ```\n"), "");
        assert_eq!(strip_code_fence("``````"), "");
        let body = r#"{"choices":[{"message":{"content":"```"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "");
    }

    #[test]
    fn unclosed_fence_is_left_alone() {
        assert_eq!(strip_code_fence("```text\napp/"), "```text\napp/");
    }

    #[test]
    fn unfenced_text_is_trimmed_only() {
        assert_eq!(strip_code_fence("\n app/\n"), "app/");
    }

    #[test]
    fn rejects_missing_credentials() {
        let config = LlmConfig {
            api_key: String::new(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            ChatClient::new(config),
            Err(LlmError::MissingCredentials("GROQ_API_KEY"))
        ));
    }
}
