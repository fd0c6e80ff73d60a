//! Wire types for the local model runtime
//!
//! These map to the Ollama-compatible `/api/show` and `/api/generate`
//! endpoints.

use serde::{Deserialize, Serialize};

/// Request for model metadata, used as the load probe
#[derive(Debug, Clone, Serialize)]
pub struct ShowRequest {
    pub model: String,
}

/// Model metadata returned by `/api/show`
#[derive(Debug, Clone, Deserialize)]
pub struct ShowResponse {
    #[serde(default)]
    pub details: Option<ModelDetails>,
}

/// Subset of the model details we log at load time
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

/// Non-streaming completion request
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Send the prompt verbatim, bypassing the runtime's chat template
    pub raw: bool,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Sampling options for `/api/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
    /// Maximum number of new tokens
    pub num_predict: u32,
    /// Layers offloaded to the accelerator (0 = CPU only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_gpu: Option<u32>,
}

/// Completion returned by `/api/generate`
///
/// `response` holds only the continuation, never the echoed prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub done: bool,
}
