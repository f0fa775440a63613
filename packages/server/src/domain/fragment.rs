//! Rendered fragments appended to the open response body.
//!
//! The markup here is an external contract: clients without script rely on
//! the exact shape of each fragment.

use std::fmt;

use axum::body::Bytes;

use super::Update;

/// Keep-alive padding written when a connection has been idle for one ping interval
pub const PING: &[u8] = b" ";

/// A unit of markup written to a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment<'a> {
    /// A message posted while the connection was live (highlighted as new)
    NewMessage(&'a Update),
    /// A message replayed from history when the connection opened
    Replayed(&'a Update),
    /// Style rule replacing the displayed connection count
    Count(usize),
}

impl Fragment<'_> {
    /// Render into an owned chunk ready to be queued
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl fmt::Display for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::NewMessage(update) => write!(
                f,
                "<div class=\"new\"><p>{}</p><time>{}</time></div>",
                update.message(),
                update.timestamp()
            ),
            Fragment::Replayed(update) => write!(
                f,
                "<div><p>{}</p><time>{}</time></div>",
                update.message(),
                update.timestamp()
            ),
            Fragment::Count(count) => write!(f, "<style>#nc::before{{content:\"{count}\"}}</style>"),
        }
    }
}

/// Escape text for safe inclusion in HTML element content and attribute values.
///
/// Escapes `<`, `>`, `&`, `'` and `"`; NUL is replaced by U+FFFD.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&#34;"),
            '\0' => escaped.push('\u{FFFD}'),
            other => escaped.push(other),
        }
    }
    escaped
}
