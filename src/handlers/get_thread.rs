// GET /threads/{threadId} handler

use std::convert::Infallible;
use tracing::debug;
use uuid::Uuid;
use warp::http::StatusCode;

use crate::models::ThreadResponse;
use crate::render::to_view;
use crate::state::SharedState;

pub async fn get_thread_handler(
    thread_id: Uuid,
    state: SharedState,
) -> Result<impl warp::Reply, Infallible> {
    let messages: Vec<_> = state
        .sessions
        .transcript(thread_id)
        .await
        .iter()
        .map(to_view)
        .collect();
    debug!(%thread_id, count = messages.len(), "GET thread");

    let response = ThreadResponse {
        thread_id,
        messages,
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::OK,
    ))
}
