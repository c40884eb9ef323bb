//! Application state shared across all request handlers

use std::sync::Arc;

use crate::chat::Assistant;
use crate::render::Branding;
use crate::session::SessionStore;

pub struct AppState {
    pub assistant: Assistant,
    pub sessions: SessionStore,
    pub branding: Branding,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(assistant: Assistant, branding: Branding) -> SharedState {
        Self::with_sessions(assistant, SessionStore::new(), branding)
    }

    pub fn with_sessions(
        assistant: Assistant,
        sessions: SessionStore,
        branding: Branding,
    ) -> SharedState {
        Arc::new(Self {
            assistant,
            sessions,
            branding,
        })
    }
}
