// DELETE /threads/{threadId} handler

use std::convert::Infallible;
use tracing::info;
use uuid::Uuid;
use warp::http::StatusCode;

use crate::state::SharedState;

pub async fn clear_thread_handler(
    thread_id: Uuid,
    state: SharedState,
) -> Result<impl warp::Reply, Infallible> {
    let existed = state.sessions.clear(thread_id).await;
    info!(%thread_id, existed, "session cleared");
    Ok(StatusCode::NO_CONTENT)
}
