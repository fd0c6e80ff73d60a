//! Hosted-API responder

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::HostedModelConfig;
use crate::llm::core::{config::GenerationConfig, error::GenerationError, provider::Responder};
use crate::llm::fallback::HOSTED_UNAVAILABLE_REPLY;

use super::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Fixed system instruction sent with every request
pub const SYSTEM_PROMPT: &str = "You are a medical AI assistant. Provide brief, concise medical information. Keep responses short - 1-2 sentences maximum. Be direct and to the point. Always remind users to consult healthcare professionals for serious concerns.";

/// Hosted replies are capped well below the local default
const HOSTED_MAX_TOKENS: u32 = 50;

/// Authenticated HTTP client, present only when an API key was configured
struct ApiClient {
    http_client: Client,
    api_key: String,
}

/// Responder backed by a remote chat-completion API
pub struct HostedResponder {
    /// `None` when no API key was configured or the client failed to build
    client: Option<ApiClient>,
    /// API base URL (e.g. "https://api.openai.com/v1")
    base_url: String,
    /// Model to use
    model_name: String,
    /// Fixed sampling parameters
    generation: GenerationConfig,
}

impl HostedResponder {
    /// Create the hosted responder
    ///
    /// A missing API key is not an error; the responder is simply inert and
    /// the selector will never pick it.
    pub fn new(config: &HostedModelConfig) -> Self {
        let client = match config.api_key.as_deref() {
            None => {
                error!("OpenAI API key not found");
                None
            }
            Some(api_key) => match Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(60))
                .build()
            {
                Ok(http_client) => {
                    info!(model = %config.model_name, "ChatGPT client initialized");
                    Some(ApiClient {
                        http_client,
                        api_key: api_key.to_string(),
                    })
                }
                Err(e) => {
                    error!("Error initializing ChatGPT client: {}", e);
                    None
                }
            },
        };

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_name: config.model_name.clone(),
            generation: GenerationConfig::new(HOSTED_MAX_TOKENS)
                .with_temperature(0.7)
                .with_top_p(0.9),
        }
    }

    /// Build the endpoint URL for chat completions
    fn build_endpoint_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
            top_p: self.generation.top_p,
        }
    }
}

#[async_trait]
impl Responder for HostedResponder {
    /// `max_tokens` is ignored: hosted replies are always capped at 50 tokens
    async fn generate(&self, prompt: &str, _max_tokens: Option<u32>) -> Result<String, GenerationError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| GenerationError::ModelUnavailable("hosted client not initialized".to_string()))?;

        let response = client
            .http_client
            .post(self.build_endpoint_url())
            .bearer_auth(&client.api_key)
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let (body, code) = match serde_json::from_str::<ApiErrorResponse>(&raw) {
                Ok(envelope) => (envelope.error.message, envelope.error.code),
                Err(_) => (raw, None),
            };
            warn!(
                status = status.as_u16(),
                code = code.as_deref().unwrap_or("none"),
                "Hosted API returned an error"
            );
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let completion = response.json::<ChatCompletionResponse>().await?;
        let text = match completion.choices.into_iter().next() {
            Some(choice) => {
                debug!(
                    finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
                    "Hosted completion received"
                );
                choice.message.content.map(|content| content.trim().to_string()).unwrap_or_default()
            }
            None => String::new(),
        };

        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }

    fn fallback(&self, _prompt: &str) -> String {
        HOSTED_UNAVAILABLE_REPLY.to_string()
    }

    fn is_available(&self) -> bool {
        self.client.is_some()
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}
