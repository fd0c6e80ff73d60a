//! Core abstractions for the responder layer

pub mod config;
pub mod error;
pub mod provider;
