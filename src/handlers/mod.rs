// Handlers module

pub mod clear_thread;
pub mod get_thread;
pub mod index;
pub mod rejection;
pub mod send_message;

pub use clear_thread::clear_thread_handler;
pub use get_thread::get_thread_handler;
pub use index::index_handler;
pub use rejection::{handle_rejection, ApiError};
pub use send_message::send_message_handler;
