//! Hosted-API responder
//!
//! Calls an OpenAI-compatible chat-completion endpoint.

pub mod client;
pub mod types;

pub use client::{HostedResponder, SYSTEM_PROMPT};
