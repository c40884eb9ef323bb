//! Mapping between abstraction types and Gemini types

use crate::llm::core::{
    config::GenerationConfig,
    types::{
        ContentDelta, FinishReason, GenerateRequest, Message, MessageMetadata, MessageRole,
        StreamEvent, UsageMetadata,
    },
};

use super::types::{
    Content, GeminiGenerationConfig, GenerateContentRequest, GenerateContentResponse, Part,
    SystemInstruction,
};

/// Where the system prompt goes in the outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemPlacement {
    /// Native `systemInstruction` field
    Instruction,
    /// Prepended to the first user turn, separated by a blank line
    #[default]
    FirstUserTurn,
}

/// Convert our abstraction request to Gemini's request format
pub fn to_gemini_request(
    request: GenerateRequest,
    placement: SystemPlacement,
) -> GenerateContentRequest {
    let mut messages = request.messages;
    let mut system_instruction = None;

    match (request.system, placement) {
        (Some(system), SystemPlacement::Instruction) => {
            system_instruction = Some(SystemInstruction {
                parts: vec![Part::text(system)],
            });
        }
        (Some(system), SystemPlacement::FirstUserTurn) => {
            match messages.iter_mut().find(|m| m.role == MessageRole::User) {
                Some(first) => first.content = format!("{}\n\n{}", system, first.content),
                None => messages.insert(0, Message::user(system)),
            }
        }
        (None, _) => {}
    }

    GenerateContentRequest {
        contents: messages.into_iter().map(to_gemini_content).collect(),
        system_instruction,
        generation_config: Some(to_gemini_generation_config(request.config)),
    }
}

fn to_gemini_content(message: Message) -> Content {
    let role = match message.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    };

    Content {
        role: role.to_string(),
        parts: vec![Part::text(message.content)],
    }
}

fn to_gemini_generation_config(config: GenerationConfig) -> GeminiGenerationConfig {
    GeminiGenerationConfig {
        max_output_tokens: Some(config.max_tokens),
        temperature: config.temperature,
        top_p: config.top_p,
        top_k: config.top_k,
        stop_sequences: config.stop_sequences,
    }
}

/// Convert one Gemini response chunk into stream events
///
/// Text parts of the first candidate become deltas. A finish reason, or a
/// prompt rejected outright, ends the message.
pub fn from_gemini_response(response: GenerateContentResponse) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    let usage = response
        .usage_metadata
        .map(|u| UsageMetadata {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            events.push(StreamEvent::MessageEnd {
                finish_reason: map_block_reason(&reason),
                usage,
            });
        }
        return events;
    };

    for part in candidate.content.parts {
        if let Some(text) = part.text {
            events.push(StreamEvent::ContentDelta {
                index: 0,
                delta: ContentDelta::TextDelta { text },
            });
        }
    }

    if let Some(reason) = candidate.finish_reason {
        events.push(StreamEvent::MessageEnd {
            finish_reason: map_finish_reason(&reason),
            usage,
        });
    }

    events
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII" => FinishReason::Safety,
        other => FinishReason::Other(other.to_string()),
    }
}

fn map_block_reason(reason: &str) -> FinishReason {
    match reason {
        "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" => FinishReason::Safety,
        other => FinishReason::Other(other.to_string()),
    }
}

/// Initial event emitted before the first chunk
pub fn create_message_start(message_id: String) -> StreamEvent {
    StreamEvent::MessageStart {
        message: MessageMetadata {
            id: message_id,
            role: MessageRole::Assistant,
        },
    }
}
