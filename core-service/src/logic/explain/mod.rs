//! Explanation Generator
//!
//! Turns a verdict plus its grounding context into analyst-style bullets
//! and writes the decision back into the knowledge corpus.

pub mod engine;
pub mod prompt;
pub mod types;


pub use engine::{decision_log_text, ExplanationGenerator};
pub use prompt::PromptTemplate;
pub use types::{split_bullets, ChatModel, ChatRequest, Explanation};
