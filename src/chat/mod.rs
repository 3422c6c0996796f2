//! Chat completion boundary
//!
//! A question is answered with exactly one request: the locale's system prompt plus
//! a user message carrying the extracted resume text and the question.

use async_trait::async_trait;
use thiserror::Error;

mod client;

pub use client::{build_user_message, HttpChatClient, QUESTION_LABEL, RESUME_LABEL};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("reply carried no content")]
    EmptyContent,
}

/// Anything that can answer a question about a resume
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(
        &self,
        system_prompt: &str,
        resume_text: &str,
        question: &str,
    ) -> Result<String, ChatError>;
}
