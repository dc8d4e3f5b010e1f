//! Public types for the chat API
use serde::{Deserialize, Serialize};

/// Marks an in-band failure in a streamed reply. The relay writes it
/// on its own line after whatever text was already streamed, followed
/// by the error message, and then closes the body.
pub const ERROR_SENTINEL: &str = "[relaychat:error]";

/// The frame must stay on one line, so newlines in `message` are
/// flattened.
pub fn error_frame(message: &str) -> String {
    format!("\n{} {}\n", ERROR_SENTINEL, message.replace('\n', " "))
}

/// Split a streamed body into the text before a trailing error frame
/// and the frame's message. Only a sentinel line that ends the body
/// counts, so replies that merely mention the sentinel are left alone.
pub fn split_error_frame(body: &str) -> Option<(&str, &str)> {
    let marker = format!("\n{} ", ERROR_SENTINEL);
    let idx = body.rfind(&marker)?;
    let rest = &body[idx + marker.len()..];
    let message = rest.strip_suffix('\n').unwrap_or(rest);
    if message.contains('\n') {
        return None;
    }
    Some((&body[..idx], message.trim()))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatRequest {
    pub prompt: String,
}

impl ChatRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Buffered reply. `response` is absent when the completion had no
/// `</think>` separator.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}
