//! Connection acceptance and handler registration.

pub mod handler;
pub mod listener;

pub use handler::Handler;
pub use listener::{create_server, Server};
