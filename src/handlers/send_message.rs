// POST /threads/{threadId} handler

use futures::channel::mpsc::{self, UnboundedSender};
use futures_util::stream::StreamExt;
use pin_utils::pin_mut;
use std::convert::Infallible;
use tracing::{debug, info, warn};
use uuid::Uuid;
use warp::sse::Event;

use crate::chat::AssistantEvent;
use crate::handlers::ApiError;
use crate::llm::Message;
use crate::models::{ChatMessage, SendMessageRequest};
use crate::render::{render_message, render_user_message};
use crate::sse::{
    create_agent_message_event, create_agent_text_event, create_done_event, create_notice_event,
    create_user_message_event,
};
use crate::state::SharedState;

pub async fn send_message_handler(
    thread_id: Uuid,
    request: SendMessageRequest,
    state: SharedState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(warp::reject::custom(ApiError::EmptyMessage));
    }
    info!(%thread_id, chars = text.chars().count(), "POST thread message");

    let history = state.sessions.replay_history(thread_id).await;
    let user_message = ChatMessage::user(text);
    state.sessions.append(thread_id, user_message.clone()).await;

    let (tx, rx) = mpsc::unbounded();
    tokio::spawn(forward_events(state, thread_id, user_message, history, tx));

    Ok(warp::sse::reply(warp::sse::keep_alive().stream(rx)))
}

/// Drive the assistant for one turn and forward its events as SSE frames.
/// Stops early once the client has gone; the reply is stored before it is sent.
async fn forward_events(
    state: SharedState,
    thread_id: Uuid,
    user_message: ChatMessage,
    history: Vec<Message>,
    tx: UnboundedSender<Result<Event, Infallible>>,
) {
    let echo = create_user_message_event(
        user_message.id.clone(),
        render_user_message(&user_message.text),
    );
    if tx.unbounded_send(echo).is_err() {
        debug!(%thread_id, "client disconnected before reply");
        return;
    }

    // All chunks of one reply share this id
    let reply_id = Uuid::new_v4().to_string();
    let events = state.assistant.respond(history, user_message.text);
    pin_mut!(events);

    while let Some(event) = events.next().await {
        let frame = match event {
            AssistantEvent::TextDelta(chunk) => create_agent_text_event(reply_id.clone(), chunk),
            AssistantEvent::Fallback(reason) => {
                warn!(%thread_id, ?reason, "answering from encyclopedia");
                create_notice_event(reason.level(), reason.notice().to_string())
            }
            AssistantEvent::Completed(reply) => {
                let message = ChatMessage::reply(reply_id.clone(), reply);
                let html = render_message(&message);
                let source = message.source;
                state.sessions.append(thread_id, message).await;
                create_agent_message_event(reply_id.clone(), source, html)
            }
        };

        if tx.unbounded_send(frame).is_err() {
            debug!(%thread_id, "client disconnected mid-reply");
            return;
        }
    }

    let _ = tx.unbounded_send(create_done_event());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Assistant;
    use crate::fallback::FallbackSource;
    use crate::llm::{
        ContentDelta, EventStream, FinishReason, GenerateRequest, GenerationConfig, LlmError,
        LlmProvider, StreamEvent, UsageMetadata,
    };
    use crate::render::Branding;
    use crate::state::AppState;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct TwoChunks {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl LlmProvider for TwoChunks {
        async fn stream_generate(&self, _request: GenerateRequest) -> Result<EventStream, LlmError> {
            *self.calls.lock().unwrap() += 1;
            let events = ["Insulin ", "lowers glucose."]
                .into_iter()
                .map(|text| {
                    Ok(StreamEvent::ContentDelta {
                        index: 0,
                        delta: ContentDelta::TextDelta {
                            text: text.to_string(),
                        },
                    })
                })
                .chain(std::iter::once(Ok(StreamEvent::MessageEnd {
                    finish_reason: FinishReason::Stop,
                    usage: UsageMetadata::default(),
                })))
                .collect::<Vec<_>>();
            Ok(Box::pin(futures::stream::iter(events)))
        }
    }

    struct NoSummary;

    #[async_trait]
    impl FallbackSource for NoSummary {
        async fn summary(&self, _condition: &str) -> String {
            String::new()
        }
    }

    fn state() -> (SharedState, Arc<TwoChunks>) {
        let provider = Arc::new(TwoChunks {
            calls: Mutex::new(0),
        });
        let assistant = Assistant::new(
            provider.clone(),
            Arc::new(NoSummary),
            GenerationConfig::default(),
        );
        (AppState::new(assistant, Branding::default()), provider)
    }

    fn frame_names(frames: &[Event]) -> Vec<&'static str> {
        frames
            .iter()
            .map(|frame| {
                let wire = frame.to_string();
                ["user_message", "agent_text", "notice", "agent_message", "done"]
                    .into_iter()
                    .find(|name| wire.contains(name))
                    .unwrap_or("unknown")
            })
            .collect()
    }

    #[tokio::test]
    async fn test_forward_events_sends_every_frame_in_order() {
        let (state, _) = state();
        let thread_id = Uuid::new_v4();
        let user_message = ChatMessage::user("insulin");
        state.sessions.append(thread_id, user_message.clone()).await;

        let (tx, rx) = mpsc::unbounded();
        forward_events(state.clone(), thread_id, user_message, vec![], tx).await;

        let frames: Vec<Event> = rx.map(|frame| frame.unwrap()).collect().await;
        assert_eq!(
            frame_names(&frames),
            vec!["user_message", "agent_text", "agent_text", "agent_message", "done"]
        );
        assert_eq!(state.sessions.transcript(thread_id).await.len(), 2);
    }

    #[tokio::test]
    async fn test_forward_events_stops_when_client_is_gone() {
        let (state, provider) = state();
        let thread_id = Uuid::new_v4();

        let (tx, rx) = mpsc::unbounded();
        drop(rx);
        forward_events(state, thread_id, ChatMessage::user("insulin"), vec![], tx).await;

        assert_eq!(*provider.calls.lock().unwrap(), 0);
    }
}
