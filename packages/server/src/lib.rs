//! Script-free streaming chat server.
//!
//! Every client keeps one chunked HTML response open. New posts are appended
//! to every open response as they arrive, the connection counter is updated
//! through a `<style>` fragment, and idle responses are padded with a single
//! space once per ping interval.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
