use serde::Serialize;
use std::convert::Infallible;
use warp::sse::Event;

use crate::chat::NoticeLevel;
use crate::models::{AgentMessageEvent, AgentTextChunk, MessageSource, NoticeEvent, UserMessageEvent};

fn json_event(name: &str, payload: &impl Serialize) -> Result<Event, Infallible> {
    let data = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    Ok(Event::default().event(name).data(data))
}

/// Echo of the accepted user message, already rendered
pub fn create_user_message_event(id: String, html: String) -> Result<Event, Infallible> {
    json_event("user_message", &UserMessageEvent { id, html })
}

/// Create an agent_text SSE event with an ID and text chunk
pub fn create_agent_text_event(id: String, chunk: String) -> Result<Event, Infallible> {
    json_event("agent_text", &AgentTextChunk { id, chunk })
}

/// Status line shown while the fallback runs
pub fn create_notice_event(level: NoticeLevel, text: String) -> Result<Event, Infallible> {
    json_event("notice", &NoticeEvent { level, text })
}

/// The final reply, rendered
pub fn create_agent_message_event(
    id: String,
    source: MessageSource,
    html: String,
) -> Result<Event, Infallible> {
    json_event("agent_message", &AgentMessageEvent { id, source, html })
}

/// Create a done SSE event to signal stream completion
pub fn create_done_event() -> Result<Event, Infallible> {
    Ok(Event::default().event("done").data("{}"))
}
