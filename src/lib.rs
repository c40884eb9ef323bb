// HTTP Server modules
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;
pub mod state;

// Conversation and answer sources
pub mod chat;
pub mod fallback;
pub mod session;

// Transcript and page rendering
pub mod render;

pub mod config;

// LLM abstraction layer
pub mod llm;
