use thiserror::Error;

/// Structural failures while turning layout text into a tree.
///
/// Neither is fatal: the caller discards the text and asks for a new layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout is empty or malformed: no root item could be parsed")]
    EmptyInput,

    #[error(
        "invalid tree structure: could not find parent for line {line}: '{name}' (depth {depth}). \
         Structure might have multiple roots or inconsistent indentation"
    )]
    OrphanedNode {
        line: usize,
        name: String,
        depth: usize,
    },
}

/// Failures talking to the text-generation service.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("missing credentials: {0} must be set")]
    MissingCredentials(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("cannot decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API response did not contain any message content")]
    EmptyResponse,
}
