//! UseCase layer: the producer path (submit + broadcast) and the consumer
//! path (one streaming connection per client).

mod broadcast;
mod error;
mod stream_connection;
mod submit_message;

pub use broadcast::Broadcaster;
pub use error::SubmitError;
pub use stream_connection::{ConnectionStream, StreamConnectionUseCase};
pub use submit_message::SubmitMessageUseCase;
