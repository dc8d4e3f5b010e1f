//! Incremental decoder for the `text/event-stream` framing used by
//! OpenAI compatible completion streams.

#[derive(Debug, PartialEq)]
pub enum SseEvent {
    Data(String),
    Done,
}

/// Accumulates raw bytes and yields complete events. Bytes are
/// buffered rather than strings because a multi-byte character can be
/// split across two network chunks.
#[derive(Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(event_end) = find_event_end(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..event_end + 2).collect();
            if let Some(event) = parse_event(&raw[..event_end]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing event that wasn't terminated by a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let raw = std::mem::take(&mut self.buffer);
        parse_event(&raw)
    }
}

fn find_event_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

fn parse_event(raw: &[u8]) -> Option<SseEvent> {
    let text = String::from_utf8_lossy(raw);
    let data = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect::<Vec<_>>()
        .join("\n");

    // Comments, keep-alives and events without data
    let data = data.trim();
    if data.is_empty() {
        return None;
    }

    if data == "[DONE]" {
        return Some(SseEvent::Done);
    }

    Some(SseEvent::Data(data.to_string()))
}
