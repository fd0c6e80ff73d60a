//! Local-inference responder
//!
//! Talks to a model runtime on the same host (Ollama-compatible HTTP API).

pub mod client;
pub mod types;

pub use client::{build_prompt, LocalResponder, MIN_REPLY_CHARS};
