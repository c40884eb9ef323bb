// Route definitions and handlers

use std::convert::Infallible;
use uuid::Uuid;
use warp::Filter;

use crate::handlers;
use crate::state::SharedState;

fn with_state(
    state: SharedState,
) -> impl Filter<Extract = (SharedState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

pub fn configure_routes(
    state: SharedState,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let thread = warp::path("api")
        .and(warp::path("v1"))
        .and(warp::path("threads"))
        .and(warp::path::param::<Uuid>())
        .and(warp::path::end());

    // GET /
    let index = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::index_handler);

    // GET /healthz
    let health = warp::path("healthz")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "ok");

    // GET /api/v1/threads/{threadId}
    let get_thread = thread
        .clone()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::get_thread_handler);

    // POST /api/v1/threads/{threadId}
    let post_message = thread
        .clone()
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::send_message_handler);

    // DELETE /api/v1/threads/{threadId}
    let clear_thread = thread
        .and(warp::delete())
        .and(with_state(state))
        .and_then(handlers::clear_thread_handler);

    index
        .or(health)
        .or(get_thread)
        .or(post_message)
        .or(clear_thread)
        .recover(handlers::handle_rejection)
}
