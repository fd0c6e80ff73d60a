//! Responder trait shared by the local and hosted implementations

use async_trait::async_trait;

use super::error::GenerationError;

/// Capability to turn a single prompt into reply text
///
/// Implementations are built once at start-up and shared across requests, so
/// `generate` must not mutate per-request state.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Generate a reply to `prompt`
    ///
    /// # Arguments
    /// * `prompt` - The raw user message; no conversation history is passed
    /// * `max_tokens` - Upper bound on new tokens, or the responder's default
    ///
    /// # Returns
    /// The trimmed reply text, or the reason generation did not produce one
    async fn generate(&self, prompt: &str, max_tokens: Option<u32>) -> Result<String, GenerationError>;

    /// Deterministic canned reply used when `generate` fails
    fn fallback(&self, prompt: &str) -> String;

    /// Whether construction-time initialisation succeeded
    fn is_available(&self) -> bool;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
