use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// One chat completion: a system role plus a single user turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

/// Language model seam (OpenAI in production, scripted in tests)
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Raw assistant text. Empty or missing content is `EmptyResponse`.
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError>;
}

/// Explanation of one decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// Cleaned bullet lines, in model order
    pub bullets: Vec<String>,
    /// Id of the decision-log document written to the corpus
    pub indexed_id: String,
}

/// Split model output into bullets: one per non-empty line, with one
/// leading list marker (`-`, `•`, `*`) and surrounding whitespace removed.
/// A marker must be followed by whitespace, so `**bold**` text is kept.
pub fn split_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| strip_marker(line.trim()).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_marker(line: &str) -> &str {
    let mut chars = line.chars();
    match (chars.next(), chars.clone().next()) {
        (Some('-' | '•' | '*'), None) => "",
        (Some('-' | '•' | '*'), Some(next)) if next.is_whitespace() => chars.as_str(),
        _ => line,
    }
}
