// GET / handler

use std::convert::Infallible;

use crate::render::render_page;
use crate::state::SharedState;

pub async fn index_handler(state: SharedState) -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::html(render_page(&state.branding)))
}
