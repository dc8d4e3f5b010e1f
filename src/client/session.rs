//! Client side state for one conversation.
use crate::api::public::chat::{ChatResponse, split_error_frame};

use super::ClientError;
use super::models::{ChatMessage, InFlightReply, Transcript};

pub const ERROR_MESSAGE: &str = "⚠️ Error occurred while fetching response.";
pub const THINKING_PREFIX: &str = "🤔 Thinking: ";
pub const RESPONSE_PREFIX: &str = "🗣️ ";

/// Where a submission is in its lifecycle. A session only ever moves
/// forward through these and then back to `Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Awaiting,
    Streaming,
    Finalizing,
}

/// Transcript, in-flight reply and loading flag for a single client.
/// At most one reply is in flight at a time: `begin_submit` refuses to
/// start another while `loading` is set.
#[derive(Default, Debug)]
pub struct ChatSession {
    transcript: Transcript,
    in_flight: Option<InFlightReply>,
    loading: bool,
    phase: Phase,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The partial reply as it should be displayed. A trailing error
    /// frame is hidden.
    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|reply| {
            let text = reply.as_str();
            split_error_frame(text).map_or(text, |(before, _)| before)
        })
    }

    /// Start a submission. Returns the prompt to send, or `None` when
    /// the input is blank or a request is already outstanding. The user
    /// message is appended before anything goes over the network.
    pub fn begin_submit(&mut self, input: &str) -> Option<String> {
        if self.loading || input.trim().is_empty() {
            return None;
        }

        self.loading = true;
        self.phase = Phase::Submitting;
        self.transcript.push(ChatMessage::user(input));

        Some(input.to_string())
    }

    pub fn mark_awaiting(&mut self) {
        self.phase = Phase::Awaiting;
    }

    pub fn begin_stream(&mut self) {
        self.phase = Phase::Streaming;
        self.in_flight = Some(InFlightReply::default());
    }

    pub fn append_chunk(&mut self, text: &str) {
        if let Some(reply) = self.in_flight.as_mut() {
            reply.push_str(text);
        }
    }

    /// Turn the streamed buffer into an assistant message. A buffer
    /// ending in an error frame is discarded and reported as an error
    /// instead.
    pub fn finish_stream(&mut self) -> Result<(), ClientError> {
        self.phase = Phase::Finalizing;
        let text = self
            .in_flight
            .take()
            .map(InFlightReply::into_string)
            .unwrap_or_default();

        if let Some((_, reason)) = split_error_frame(&text) {
            return Err(ClientError::Relay(reason.to_string()));
        }

        self.transcript.push(ChatMessage::assistant(&text));
        Ok(())
    }

    /// Append the thinking and response parts of a buffered reply as
    /// separate messages, skipping whichever is missing or blank.
    pub fn finish_buffered(&mut self, reply: ChatResponse) {
        self.phase = Phase::Finalizing;
        self.in_flight = None;

        if let Some(thinking) = reply.thinking.filter(|t| !t.is_empty()) {
            self.transcript
                .push(ChatMessage::assistant(&format!("{THINKING_PREFIX}{thinking}")));
        }
        if let Some(response) = reply.response.filter(|r| !r.is_empty()) {
            self.transcript
                .push(ChatMessage::assistant(&format!("{RESPONSE_PREFIX}{response}")));
        }
    }

    /// Replace whatever was in flight with the single error message.
    pub fn fail(&mut self) {
        self.phase = Phase::Finalizing;
        self.in_flight = None;
        self.transcript.push(ChatMessage::assistant(ERROR_MESSAGE));
    }

    /// Clear the loading flag and return to idle. Runs on every exit
    /// path of a submission.
    pub fn settle(&mut self) {
        self.in_flight = None;
        self.loading = false;
        self.phase = Phase::Idle;
    }
}
