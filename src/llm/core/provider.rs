//! Provider trait for LLM implementations

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;

use super::{
    error::LlmError,
    types::{GenerateRequest, StreamEvent},
};
use crate::llm::gemini::{GeminiClient, GeminiSettings};

/// Boxed stream of generation events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// Interface the chat flow uses to reach a model
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stream generate content from the LLM
    ///
    /// Returns a stream of incremental events. An `Err` here means the request
    /// never produced a response; errors inside the stream mean it broke off
    /// part way.
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError>;
}

/// Build the configured Gemini provider
///
/// # Example
///
/// ```rust,no_run
/// use medassist::llm::{create_provider, GeminiBackend, GeminiModel, GeminiSettings};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = GeminiSettings::new(
///     GeminiModel::default(),
///     GeminiBackend::DeveloperApi { api_key: "key".to_string() },
/// );
/// let provider = create_provider(settings).await?;
/// # Ok(())
/// # }
/// ```
pub async fn create_provider(settings: GeminiSettings) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let client = GeminiClient::new(settings).await?;
    Ok(Arc::new(client))
}
