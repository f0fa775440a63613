//! Utilities shared by the kairan packages: logging setup and clock abstraction.

pub mod logger;
pub mod time;
