//! Inference: one chat-completion call to an OpenAI-compatible endpoint.
//!
//! The default target is the Hugging Face inference router, which proxies
//! OpenAI-style `/chat/completions` requests to hosted models. The request
//! carries a single user message; there is no system prompt, streaming,
//! retry, or tool use.

use crate::config::AnalyzerConfig;
use crate::error::GradeCheckError;
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Sends a prompt to a language model and returns the reply content.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Returns the content of the first choice's message: usually a JSON
    /// string, occasionally already-structured JSON.
    async fn complete(&self, prompt: &str) -> Result<Value, GradeCheckError>;
}

/// Request body for `/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: Vec<ChatMessage<'a>>,
    pub model: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    /// A request containing one user-role message.
    pub fn user(prompt: &'a str, model: &'a str) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            model,
        }
    }
}

/// Chat-completion client for the Hugging Face router.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    http: Client,
    api_url: String,
    model: String,
    token: Option<String>,
}

impl HuggingFaceClient {
    /// Build a client from config. A missing token is not an error here; it
    /// is reported on the first call so the service can start without one.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, GradeCheckError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            token: config.hf_token.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl InferenceClient for HuggingFaceClient {
    async fn complete(&self, prompt: &str) -> Result<Value, GradeCheckError> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(GradeCheckError::MissingToken)?;

        let start = Instant::now();
        debug!(
            "POST {} model={} prompt={} chars",
            self.api_url,
            self.model,
            prompt.len()
        );

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&ChatRequest::user(prompt, &self.model))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("Inference request failed with HTTP {}", status.as_u16());
            return Err(GradeCheckError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response.json().await?;
        let content = first_message_content(&data)?;

        info!(
            "Inference complete in {}ms ({})",
            start.elapsed().as_millis(),
            self.model
        );
        Ok(content)
    }
}

/// Pull `choices[0].message.content` out of a chat-completion response.
pub fn first_message_content(response: &Value) -> Result<Value, GradeCheckError> {
    response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .filter(|c| !c.is_null())
        .cloned()
        .ok_or(GradeCheckError::UnexpectedResponse)
}
