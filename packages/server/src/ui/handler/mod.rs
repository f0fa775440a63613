//! Request handlers.

mod http;
mod timeline;

pub use http::{debug_state, health_check};
pub use timeline::{ignore_method, stream_timeline, submit_message};
