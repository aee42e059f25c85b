use crate::error::SourceError;
use mediahook_config::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for an OpenAI-compatible chat completion endpoint.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// `proxy` applies to both http and https traffic; empty means direct.
    pub fn new(api_key: impl Into<String>, proxy: Option<&str>) -> Result<Self, SourceError> {
        let mut builder = Client::builder();
        if let Some(proxy) = proxy.map(str::trim).filter(|p| !p.is_empty()) {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: 0.7,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if !base_url.trim().is_empty() {
            self.base_url = base_url.trim().trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one user message and return the first choice's content.
    pub async fn try_chat_completion(&self, message: &str) -> Result<String, SourceError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: message.to_string(),
            }],
            temperature: self.temperature,
        };

        debug!(model = %self.model, endpoint = %self.endpoint(), "Sending chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                service: "openai",
                status,
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SourceError::UnexpectedResponse("chat completion returned no choices".to_string()))
    }

    /// Like [`Self::try_chat_completion`] but logs failures and returns `None`.
    /// Callers treat `None` as "no usable answer" and must not retry.
    pub async fn chat_completion(&self, message: &str) -> Option<String> {
        match self.try_chat_completion(message).await {
            Ok(content) => Some(content),
            Err(SourceError::Status { status, body, .. }) => {
                error!(status, body = %body, "Chat completion failed");
                None
            }
            Err(e) => {
                error!(error = %e, "Chat completion request error");
                None
            }
        }
    }
}
