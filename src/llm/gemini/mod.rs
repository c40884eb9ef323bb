//! Gemini provider implementation
//!
//! Streams `generateContent` responses from either the Gemini Developer API
//! or Vertex AI and exposes them through the `LlmProvider` trait.

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

pub use client::{GeminiBackend, GeminiClient, GeminiModel, GeminiSettings};
pub use mapper::SystemPlacement;
