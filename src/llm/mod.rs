//! LLM Abstraction Layer
//!
//! A small provider interface plus a Google Gemini client that speaks either
//! the Gemini Developer API (API key) or Vertex AI (Application Default
//! Credentials).

pub mod auth;
pub mod core;
pub mod gemini;

// Re-export commonly used types
pub use core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{create_provider, EventStream, LlmProvider},
    types::{
        ContentDelta, FinishReason, GenerateRequest, Message, MessageRole, StreamEvent,
        UsageMetadata,
    },
};

pub use gemini::{GeminiBackend, GeminiClient, GeminiModel, GeminiSettings, SystemPlacement};
