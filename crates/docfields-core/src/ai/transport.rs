//! Chat-completion transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::probe::ProbeTarget;
use crate::error::AiError;
use crate::models::config::AiCredentials;

/// A single chat-completion call against one deployment.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub target: ProbeTarget,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Sends chat-completion requests and returns the assistant's content.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AiError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: [CompletionMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionContent,
}

#[derive(Deserialize)]
struct CompletionContent {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Azure OpenAI-style transport over `reqwest`.
pub struct ReqwestTransport {
    credentials: AiCredentials,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(credentials: AiCredentials, timeout: Duration) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Network(e.to_string()))?;
        Ok(Self { credentials, client })
    }

    fn endpoint(&self, target: &ProbeTarget) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.credentials.api_url, target.deployment, target.api_version
        )
    }
}

#[async_trait]
impl ChatTransport for ReqwestTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AiError> {
        let body = CompletionRequest {
            messages: [
                CompletionMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                CompletionMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = self.endpoint(&request.target);
        trace!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .header("api-key", &self.credentials.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        decode_completion(status, &text)
    }
}

/// Map an HTTP status and body to the first choice's content.
fn decode_completion(status: StatusCode, body: &str) -> Result<String, AiError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());
        return Err(AiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| AiError::InvalidResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AiError::InvalidResponse("no content in first choice".to_string()))
}
