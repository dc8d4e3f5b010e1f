//! The chat client: session state, the relay transport and terminal
//! rendering.

mod decode;
mod models;
pub mod relay;
pub mod render;
pub mod session;

pub use decode::Utf8Decoder;
pub use models::{ChatMessage, InFlightReply, Transcript};
pub use relay::{RelayClient, consume_stream};
pub use session::{ChatSession, Phase};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request to relay failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Relay responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Relay reported an upstream failure: {0}")]
    Relay(String),
}
