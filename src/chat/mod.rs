//! The request flow behind one chat turn
//!
//! The assistant:
//! - assembles the prompt from the system template, replayed history and input
//! - streams the model's reply
//! - checks that the reply has content
//! - falls back to the encyclopedia summary when it is blank or the call fails

pub mod prompt;

pub use prompt::{build_request, SYSTEM_PROMPT};

use async_stream::stream;
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fallback::FallbackSource;
use crate::llm::{ContentDelta, GenerationConfig, LlmError, LlmProvider, Message, StreamEvent};

/// Events produced while answering one user message
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantEvent {
    /// Model text as it streams in
    TextDelta(String),
    /// The model path was abandoned; the encyclopedia is being consulted
    Fallback(FallbackReason),
    /// Final reply, always the last event
    Completed(Reply),
}

/// Why the model answer was not used
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The model answered with nothing but whitespace
    EmptyResponse,
    /// The call failed before or during streaming
    ProviderFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

impl FallbackReason {
    /// Text shown to the user while the fallback runs
    pub fn notice(&self) -> &'static str {
        match self {
            FallbackReason::EmptyResponse => "🤖 Gemini gave no response, fetching Wikipedia info...",
            FallbackReason::ProviderFailed(_) => "⚠️ Gemini failed. Fetching Wikipedia info...",
        }
    }

    pub fn level(&self) -> NoticeLevel {
        match self {
            FallbackReason::EmptyResponse => NoticeLevel::Warning,
            FallbackReason::ProviderFailed(_) => NoticeLevel::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Model,
    Encyclopedia,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub source: ReplySource,
    pub text: String,
}

/// Answers medical-condition questions with a model, backed by an encyclopedia
#[derive(Clone)]
pub struct Assistant {
    provider: Arc<dyn LlmProvider>,
    fallback: Arc<dyn FallbackSource>,
    config: GenerationConfig,
}

impl Assistant {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        fallback: Arc<dyn FallbackSource>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            provider,
            fallback,
            config,
        }
    }

    /// Answer `input` given the replayed `history`
    ///
    /// The stream never errors: failures turn into a `Fallback` event
    /// followed by the encyclopedia reply. `input` doubles as the
    /// encyclopedia article title.
    pub fn respond(
        &self,
        history: Vec<Message>,
        input: String,
    ) -> impl Stream<Item = AssistantEvent> + Send + 'static {
        let this = self.clone();

        stream! {
            let request = build_request(&history, &input, &this.config);

            let outcome: Result<String, LlmError> = match this.provider.stream_generate(request).await {
                Ok(mut llm_stream) => {
                    let mut text = String::new();
                    let mut failure = None;

                    while let Some(event) = llm_stream.next().await {
                        match event {
                            Ok(StreamEvent::ContentDelta {
                                delta: ContentDelta::TextDelta { text: chunk },
                                ..
                            }) => {
                                text.push_str(&chunk);
                                yield AssistantEvent::TextDelta(chunk);
                            }
                            Ok(StreamEvent::MessageEnd { finish_reason, usage }) => {
                                debug!(?finish_reason, total_tokens = usage.total_tokens, "model reply finished");
                                break;
                            }
                            Ok(StreamEvent::MessageStart { .. }) => {}
                            Err(e) => {
                                failure = Some(e);
                                break;
                            }
                        }
                    }

                    match failure {
                        Some(e) => Err(e),
                        None => Ok(text),
                    }
                }
                Err(e) => Err(e),
            };

            let reason = match outcome {
                Ok(text) if !text.trim().is_empty() => {
                    yield AssistantEvent::Completed(Reply {
                        source: ReplySource::Model,
                        text,
                    });
                    return;
                }
                Ok(_) => {
                    warn!("model returned an empty reply, using encyclopedia");
                    FallbackReason::EmptyResponse
                }
                Err(e) => {
                    warn!(error = %e, "model call failed, using encyclopedia");
                    FallbackReason::ProviderFailed(e.to_string())
                }
            };

            yield AssistantEvent::Fallback(reason);

            let summary = this.fallback.summary(&input).await;
            yield AssistantEvent::Completed(Reply {
                source: ReplySource::Encyclopedia,
                text: summary,
            });
        }
    }
}
