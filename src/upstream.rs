//! Client for the hosted chat-completions gateway that writes the recipes.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::Config;

pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("gateway rate limit exceeded")]
    RateLimited,

    #[error("gateway credits exhausted")]
    CreditsExhausted,

    #[error("gateway returned {status}")]
    Status { status: u16, body: String },

    #[error("gateway reported an error: {0}")]
    Gateway(String),

    #[error("no content in gateway response")]
    EmptyContent,

    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("failed to decode gateway response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A text-generation backend. The handler makes exactly one `complete` call
/// per recipe request.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns the content of the first completion.
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<String, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<GatewayErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    completions_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &Url, timeout: Option<std::time::Duration>) -> Result<Self, UpstreamError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        let base = base_url.as_str().trim_end_matches('/');
        Ok(Self {
            http,
            completions_url: format!("{base}/chat/completions"),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        Self::new(&config.gateway_base_url, config.gateway_timeout)
    }
}

#[async_trait]
impl ChatBackend for GatewayClient {
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<String, UpstreamError> {
        debug!(model = %request.model, url = %self.completions_url, "calling AI gateway");
        let response = self
            .http
            .post(&self.completions_url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_failure(status, response).await);
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| UpstreamError::Decode(err.to_string()))?;
        first_content(payload)
    }
}

async fn classify_failure(status: StatusCode, response: reqwest::Response) -> UpstreamError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited,
        StatusCode::PAYMENT_REQUIRED => UpstreamError::CreditsExhausted,
        _ => {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "AI gateway error");
            UpstreamError::Status { status: status.as_u16(), body }
        }
    }
}

fn first_content(payload: ChatCompletionResponse) -> Result<String, UpstreamError> {
    let content = payload
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty());
    match (content, payload.error.and_then(|err| err.message)) {
        (Some(content), _) => Ok(content),
        (None, Some(message)) => Err(UpstreamError::Gateway(message)),
        (None, None) => Err(UpstreamError::EmptyContent),
    }
}
