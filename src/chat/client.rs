//! HTTP chat-completion client

use super::{ChatBackend, ChatError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Label placed before the resume text in the user message
pub const RESUME_LABEL: &str = "这是一份履歷的內容：";
/// Label placed before the question in the user message
pub const QUESTION_LABEL: &str = "問題：";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, if non-empty
    fn into_answer(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
    }
}

/// User message: resume text and question behind their fixed labels
pub fn build_user_message(resume_text: &str, question: &str) -> String {
    format!(
        "{}\n\n{}\n\n{}{}",
        RESUME_LABEL, resume_text, QUESTION_LABEL, question
    )
}

/// Posts questions to a chat-completion endpoint.
///
/// One request per question. No retries, and the transport's own timeout
/// behaviour is left untouched.
#[derive(Clone)]
pub struct HttpChatClient {
    client: Client,
    endpoint: url::Url,
}

impl HttpChatClient {
    pub fn new(endpoint: url::Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    async fn ask(
        &self,
        system_prompt: &str,
        resume_text: &str,
        question: &str,
    ) -> Result<String, ChatError> {
        let user_content = build_user_message(resume_text, question);
        let request_body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_content,
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "chat endpoint returned an error status");
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let reply: ChatResponse = serde_json::from_slice(&body)?;
        let answer = reply.into_answer().ok_or(ChatError::EmptyContent)?;

        debug!(answer_chars = answer.len(), "chat reply received");
        Ok(answer)
    }
}
