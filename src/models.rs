// Data structures (chat messages, API payloads)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::{NoticeLevel, Reply, ReplySource};
use crate::llm::Message;

// Who produced a transcript entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    User,
    Model,
    Encyclopedia,
}

impl From<ReplySource> for MessageSource {
    fn from(source: ReplySource) -> Self {
        match source {
            ReplySource::Model => MessageSource::Model,
            ReplySource::Encyclopedia => MessageSource::Encyclopedia,
        }
    }
}

// One entry of the displayed transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub source: MessageSource,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: MessageSource::User,
            timestamp: Utc::now(),
            text: text.into(),
        }
    }

    pub fn reply(id: impl Into<String>, reply: Reply) -> Self {
        Self {
            id: id.into(),
            source: reply.source.into(),
            timestamp: Utc::now(),
            text: reply.text,
        }
    }

    // The model-facing form of this entry; encyclopedia text has none
    pub fn to_llm_message(&self) -> Option<Message> {
        match self.source {
            MessageSource::User => Some(Message::user(self.text.clone())),
            MessageSource::Model => Some(Message::assistant(self.text.clone())),
            MessageSource::Encyclopedia => None,
        }
    }
}

// Transcript entry as served to the widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: String,
    pub source: MessageSource,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub html: String,
}

// Thread Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadResponse {
    pub thread_id: Uuid,
    pub messages: Vec<MessageView>,
}

// Request Types
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

// SSE Event Types
#[derive(Debug, Clone, Serialize)]
pub struct UserMessageEvent {
    pub id: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentTextChunk {
    pub id: String,
    pub chunk: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoticeEvent {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentMessageEvent {
    pub id: String,
    pub source: MessageSource,
    pub html: String,
}
