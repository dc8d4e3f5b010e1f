mod core;
mod sse;

pub use self::core::{
    CompletionRequest, Message, Role, UpstreamError, completion, completion_stream,
};
pub use sse::{SseDecoder, SseEvent};
