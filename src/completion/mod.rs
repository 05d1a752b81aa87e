use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::Value;

use crate::config::CompletionConfig;
use crate::conversation::Conversation;
use crate::error::CompletionError;

/// Anything that can turn a conversation into the assistant's next reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, conversation: &Conversation) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct CompletionPayload<'a> {
    model: &'a str,
    messages: &'a Conversation,
    temperature: f32,
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiClient {
    endpoint: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: &CompletionConfig) -> anyhow::Result<Self> {
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let endpoint = format!("{}/v1/chat/completions", config.base_url.trim_end_matches('/'));
        info!(
            "Using completion provider at {} (model: {}, timeout: {:?})",
            endpoint, config.model, config.timeout
        );

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.timeout,
            client,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.timeout)
        } else {
            CompletionError::Transport(err)
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, conversation: &Conversation) -> Result<String, CompletionError> {
        let payload = CompletionPayload {
            model: &self.model,
            messages: conversation,
            temperature: self.temperature,
        };

        debug!("Sending {} messages to {}", conversation.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            debug!("Provider error body: {}", body);
            let message = provider_error_message(&body)
                .unwrap_or_else(|| "no error message in response".to_string());
            return Err(CompletionError::Status { status, message });
        }

        let data: Value = serde_json::from_str(&body)?;
        let content = extract_content(&data);
        if content.is_empty() {
            warn!("Completion provider returned no content");
        }

        Ok(content.to_string())
    }
}

/// `choices[0].message.content`, or an empty string when any level is missing.
fn extract_content(data: &Value) -> &str {
    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn provider_error_message(body: &str) -> Option<String> {
    let data: Value = serde_json::from_str(body).ok()?;
    data.pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
