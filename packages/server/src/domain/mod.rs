//! Domain layer: the values that flow between producers and connections.
//!
//! Nothing here touches locks, channels or sockets.

pub mod connection;
pub mod fragment;
pub mod update;

pub use connection::{ConnectionId, ConnectionState};
pub use fragment::{Fragment, escape_html};
pub use update::Update;
