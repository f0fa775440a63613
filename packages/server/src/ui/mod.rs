//! HTTP surface of the chat server.

mod error;
mod handler;
pub mod page;
mod server;
mod signal;
pub mod state;

pub use error::ServerError;
pub use server::Server;
pub use signal::shutdown_signal;
