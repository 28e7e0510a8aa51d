//! HTTP client for an OpenAI-compatible chat-completions provider.
//!
//! Configuration comes from [`ProviderConfig`]:
//! - `base_url` - provider root, e.g. `https://api.openai.com/v1`
//! - `api_key` - sent as a bearer token when present
//! - `model` - model name put into every request

use async_trait::async_trait;
use reqwest::Client;

use super::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};
use super::{GenerationFailure, Generator};
use crate::config::ProviderConfig;
use crate::prompt::Prompt;

/// [`Generator`] backed by a remote chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl ProviderClient {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(&config.base_url, config.api_key.clone(), &config.model)
    }

    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            client: Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the request body for one call.
    pub fn chat_request(&self, prompt: &Prompt, schema: Option<&ResponseFormat>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(prompt.system.as_str()),
                ChatMessage::user(prompt.user.as_str()),
            ],
            response_format: schema.cloned(),
        }
    }

    /// Convert the HTTP response into the first choice's text.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<String, GenerationFailure> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationFailure::MalformedEnvelope(e.to_string()))?;

        envelope
            .first_text()
            .map(str::to_string)
            .ok_or(GenerationFailure::EmptyResponse)
    }
}

#[async_trait]
impl Generator for ProviderClient {
    async fn generate(
        &self,
        prompt: &Prompt,
        schema: Option<&ResponseFormat>,
    ) -> Result<String, GenerationFailure> {
        let body = self.chat_request(prompt, schema);

        let mut req = self.client.post(self.completions_url()).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| GenerationFailure::Transport(e.to_string()))?;

        self.handle_response(response).await
    }
}
