//! Local-inference responder

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{Device, LocalModelConfig};
use crate::llm::core::{config::GenerationConfig, error::GenerationError, provider::Responder};
use crate::llm::fallback;

use super::types::{GenerateOptions, GenerateRequest, GenerateResponse, ShowRequest, ShowResponse};

/// Replies shorter than this (in characters) are treated as failures
pub const MIN_REPLY_CHARS: usize = 10;

const TOP_P: f32 = 0.9;
const REPETITION_PENALTY: f32 = 1.1;
/// Ask the runtime to offload every layer
const ALL_LAYERS: u32 = 999;

/// Wrap a user prompt in the fixed instruction template
pub fn build_prompt(prompt: &str) -> String {
    format!(
        "You are a helpful medical AI assistant. Answer medical questions clearly and informatively.\n\nUser: {}\nAssistant:",
        prompt
    )
}

/// Model handle recorded after a successful load
#[derive(Debug, Clone)]
struct LoadedModel {
    name: String,
    num_gpu: Option<u32>,
}

/// Responder backed by a model served from a local runtime
///
/// Loading happens once in [`LocalResponder::load`]. If the model cannot be
/// loaded the responder stays usable but every call to `generate` fails with
/// `ModelUnavailable`, so callers fall back to canned replies.
pub struct LocalResponder {
    /// HTTP client for the runtime
    http_client: Client,
    /// Runtime base URL
    base_url: String,
    /// Sampling defaults
    generation: GenerationConfig,
    /// `None` when loading failed
    model: Option<LoadedModel>,
}

impl LocalResponder {
    /// Load the configured model from the local runtime
    ///
    /// Never fails: load problems are logged and leave the responder in
    /// fallback-only mode.
    pub async fn load(config: &LocalModelConfig) -> Self {
        let generation = GenerationConfig::new(config.max_length)
            .with_temperature(config.temperature)
            .with_top_p(TOP_P)
            .with_repetition_penalty(REPETITION_PENALTY);
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http_client = match Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(300))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to create HTTP client for local model: {}", e);
                return Self::unavailable(base_url, generation);
            }
        };

        info!(model = %config.model_name, "Loading local medical model");

        let mut responder = Self {
            http_client,
            base_url,
            generation,
            model: None,
        };

        match responder.probe_model(&config.model_name).await {
            Ok(response) => {
                let num_gpu = resolve_offload(config.device);
                let details = response.details.unwrap_or_default();
                info!(
                    model = %config.model_name,
                    family = details.family.as_deref().unwrap_or("unknown"),
                    parameters = details.parameter_size.as_deref().unwrap_or("unknown"),
                    quantization = details.quantization_level.as_deref().unwrap_or("unknown"),
                    device = ?config.device,
                    "Local model loaded"
                );
                responder.model = Some(LoadedModel {
                    name: config.model_name.clone(),
                    num_gpu,
                });
            }
            Err(e) => {
                error!(model = %config.model_name, "Error loading model: {}", e);
            }
        }

        responder
    }

    /// Build a responder that never had a model
    pub fn unavailable(base_url: impl Into<String>, generation: GenerationConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
            generation,
            model: None,
        }
    }

    async fn probe_model(&self, model_name: &str) -> Result<ShowResponse, GenerationError> {
        let url = format!("{}/api/show", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&ShowRequest {
                model: model_name.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<ShowResponse>().await?)
    }

    fn build_request(&self, model: &LoadedModel, prompt: &str, max_tokens: u32) -> GenerateRequest {
        GenerateRequest {
            model: model.name.clone(),
            prompt: build_prompt(prompt),
            raw: true,
            stream: false,
            options: GenerateOptions {
                temperature: self.generation.temperature,
                top_p: self.generation.top_p,
                repeat_penalty: self.generation.repetition_penalty,
                num_predict: max_tokens,
                num_gpu: model.num_gpu,
            },
        }
    }
}

fn resolve_offload(device: Device) -> Option<u32> {
    match device {
        // runtime offloads to an accelerator when it detects one
        Device::Auto => None,
        Device::Accelerator => Some(ALL_LAYERS),
        Device::Cpu => Some(0),
    }
}

#[async_trait]
impl Responder for LocalResponder {
    async fn generate(&self, prompt: &str, max_tokens: Option<u32>) -> Result<String, GenerationError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| GenerationError::ModelUnavailable("local model not loaded".to_string()))?;

        let request = self.build_request(model, prompt, max_tokens.unwrap_or(self.generation.max_tokens));
        let url = format!("{}/api/generate", self.base_url);

        let response = self.http_client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Local runtime rejected generation request");
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let generated = response.json::<GenerateResponse>().await?;
        if !generated.done {
            debug!("Local runtime returned an unfinished generation");
        }
        let text = generated.response.trim();
        let len = text.chars().count();
        if len == 0 {
            return Err(GenerationError::EmptyResponse);
        }
        if len < MIN_REPLY_CHARS {
            return Err(GenerationError::ResponseTooShort { len });
        }

        Ok(text.to_string())
    }

    fn fallback(&self, prompt: &str) -> String {
        fallback::keyword_reply(prompt).to_string()
    }

    fn is_available(&self) -> bool {
        self.model.is_some()
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_template() {
        let prompt = build_prompt("What is a fever?");
        assert!(prompt.starts_with("You are a helpful medical AI assistant."));
        assert!(prompt.contains("\n\nUser: What is a fever?\n"));
        assert!(prompt.ends_with("Assistant:"));
    }

    #[test]
    fn test_resolve_offload() {
        assert_eq!(resolve_offload(Device::Auto), None);
        assert_eq!(resolve_offload(Device::Accelerator), Some(ALL_LAYERS));
        assert_eq!(resolve_offload(Device::Cpu), Some(0));
    }

    #[tokio::test]
    async fn test_unavailable_responder_errors_and_falls_back() {
        let responder = LocalResponder::unavailable("http://127.0.0.1:1", GenerationConfig::default());
        assert!(!responder.is_available());

        let err = responder.generate("What causes diabetes?", None).await.unwrap_err();
        assert!(matches!(err, GenerationError::ModelUnavailable(_)));
        assert_eq!(
            responder.fallback("What causes diabetes?"),
            fallback::keyword_reply("diabetes")
        );
    }

    #[test]
    fn test_build_request_uses_sampling_defaults() {
        let responder = LocalResponder::unavailable(
            "http://localhost:11434",
            GenerationConfig::new(200).with_repetition_penalty(REPETITION_PENALTY),
        );
        let model = LoadedModel {
            name: "medllm".to_string(),
            num_gpu: Some(0),
        };

        let request = responder.build_request(&model, "hi", 42);
        assert_eq!(request.model, "medllm");
        assert!(request.raw);
        assert_eq!(request.options.num_predict, 42);
        assert_eq!(request.options.top_p, 0.9);
        assert_eq!(request.options.repeat_penalty, Some(1.1));
        assert_eq!(request.options.num_gpu, Some(0));
    }
}
