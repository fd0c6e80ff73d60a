// HTTP Server modules
pub mod handlers;
pub mod models;
pub mod routes;

// Chat orchestration
pub mod config;
pub mod service;
pub mod telemetry;

// Conversation persistence
pub mod store;

// Responder layer
pub mod llm;
