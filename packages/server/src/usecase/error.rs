//! UseCase error types.

use thiserror::Error;

/// Reasons a submitted message is not admitted.
///
/// These are silent to the poster: the HTTP layer redirects either way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Raw field longer than the configured maximum (in bytes)
    #[error("message is {len} bytes long, the limit is {max}")]
    TooLong { len: usize, max: usize },

    /// Nothing left after escaping and trimming
    #[error("message is empty")]
    Empty,
}
