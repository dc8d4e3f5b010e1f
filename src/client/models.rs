//! The models for a chat session held by the client.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::openai::Role;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn user(content: &str) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Append-only list of messages. There is no way to edit or remove a
/// message once it has been pushed.
#[derive(Default, Debug)]
pub struct Transcript(Vec<ChatMessage>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.0
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.0.push(msg)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The assistant reply currently being streamed.
#[derive(Default, Debug)]
pub struct InFlightReply {
    buffer: String,
}

impl InFlightReply {
    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text)
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}
