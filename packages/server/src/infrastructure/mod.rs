//! In-process shared state: the bounded history and the connection registry.
//!
//! Both are guarded by reader/writer locks. When both are needed the lock
//! order is always history first, registry second.

pub mod history;
pub mod registry;

pub use history::History;
pub use registry::{ConnectionRegistry, Delivery, Queue};
