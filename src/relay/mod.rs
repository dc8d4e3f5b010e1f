//! The relay between the chat endpoint and the upstream completion
//! API.

mod postprocess;
mod stream;

pub use postprocess::{THINK_SEPARATOR, clean_line, clean_text, split_reasoning};
pub use stream::relay_body;

/// How the endpoint returns a completion to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseMode {
    /// Wait for the full completion and respond with JSON.
    Buffered,
    /// Forward deltas as a raw text stream.
    Streaming,
}

impl ResponseMode {
    /// Callers opt into buffered mode by accepting `application/json`.
    /// Everything else streams.
    pub fn from_accept(accept: Option<&str>) -> Self {
        match accept {
            Some(value)
                if value
                    .split(',')
                    .any(|part| part.trim().starts_with("application/json")) =>
            {
                ResponseMode::Buffered
            }
            _ => ResponseMode::Streaming,
        }
    }
}
