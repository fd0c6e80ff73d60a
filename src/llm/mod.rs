//! Responder layer
//!
//! A [`Responder`] turns a prompt into reply text. There are two
//! implementations, a local model runtime and a hosted chat-completion API,
//! and a [`ModelSelector`] that decides which one serves each request.

pub mod core;
pub mod fallback;
pub mod hosted;
pub mod local;
pub mod selector;

// Re-export commonly used types
pub use core::{config::GenerationConfig, error::GenerationError, provider::Responder};
pub use fallback::FallbackCategory;
pub use hosted::HostedResponder;
pub use local::LocalResponder;
pub use selector::{ActiveModel, ModelSelector};
