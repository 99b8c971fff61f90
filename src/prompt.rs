//! Wraps the user's message in the instructions sent upstream.
//!
//! Each request is single-turn: the wrapped prompt is the only message in the conversation.
const ANSWER_TEMPLATE: &str = include_str!("prompts/answer_v1.txt");

/// Bumped whenever `prompts/answer_v*.txt` changes in a way that affects answers.
pub const PROMPT_VERSION: u32 = 1;

pub fn build_prompt(message: &str) -> String {
    format!("{}\n\nUser question: {message}", ANSWER_TEMPLATE.trim_end())
}
