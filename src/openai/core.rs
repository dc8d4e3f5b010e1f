use std::time::Duration;

use anyhow::{Error, Result};
use async_stream::try_stream;
use futures::Stream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sse::{SseDecoder, SseEvent};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Payload for `POST /chat/completions`. Built fresh for every relay
/// call and only ever carries the current prompt.
#[derive(Clone, Serialize, Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn single_turn(model: &str, prompt: &str, stream: bool) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![Message::new(Role::User, prompt)],
            stream,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Upstream completion is missing content: {0}")]
    MissingContent(String),
    #[error("Malformed completion chunk: {0}")]
    MalformedChunk(String),
    #[error("Upstream stream failed: {0}")]
    Stream(String),
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunkChoice {
    #[serde(default)]
    delta: Delta,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<CompletionChunkChoice>,
    // Some providers report failures in-band after the stream started
    error: Option<Value>,
}

fn completions_url(api_base_url: &str) -> String {
    format!("{}/chat/completions", api_base_url.trim_end_matches('/'))
}

async fn send(
    payload: &CompletionRequest,
    api_base_url: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<reqwest::Response, Error> {
    let response = reqwest::Client::new()
        .post(completions_url(api_base_url))
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(timeout)
        .json(payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status { status, body }.into());
    }

    Ok(response)
}

/// Request a full completion and return the text of the first choice.
pub async fn completion(
    prompt: &str,
    api_base_url: &str,
    api_key: &str,
    model: &str,
) -> Result<String, Error> {
    let payload = CompletionRequest::single_turn(model, prompt, false);
    let response: Value = send(&payload, api_base_url, api_key, Duration::from_secs(60 * 10))
        .await?
        .json()
        .await?;

    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| UpstreamError::MissingContent(response.to_string()))?;

    Ok(content.to_string())
}

/// Extract the delta text from a single chunk. Chunks without content
/// (role announcements, usage reports, the final stop chunk) yield an
/// empty string.
fn delta_content(data: &str) -> Result<String, Error> {
    let chunk = serde_json::from_str::<CompletionChunk>(data).map_err(|e| {
        tracing::error!("Parsing completion chunk failed for {}\nError:{}", data, e);
        UpstreamError::MalformedChunk(format!("{}: {}", e, data))
    })?;

    if let Some(err) = chunk.error {
        return Err(UpstreamError::Stream(err.to_string()).into());
    }

    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default();

    Ok(content)
}

/// Open a streaming completion. Connection failures and non-success
/// statuses are returned before any delta is produced. Once the stream
/// is returned, every item is the text of one upstream delta in the
/// order it was received, and the stream ends at `[DONE]` or when the
/// upstream body is exhausted.
pub async fn completion_stream(
    prompt: &str,
    api_base_url: &str,
    api_key: &str,
    model: &str,
) -> Result<impl Stream<Item = Result<String, Error>> + Send + 'static, Error> {
    let payload = CompletionRequest::single_turn(model, prompt, true);
    let response = send(&payload, api_base_url, api_key, Duration::from_secs(60 * 5)).await?;
    let mut bytes = response.bytes_stream();

    Ok(try_stream! {
        let mut decoder = SseDecoder::new();

        'outer: while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(Error::from)?;
            for event in decoder.push(&chunk) {
                match event {
                    SseEvent::Done => break 'outer,
                    SseEvent::Data(data) => {
                        let content = delta_content(&data)?;
                        yield content;
                    }
                }
            }
        }

        if let Some(SseEvent::Data(data)) = decoder.finish() {
            let content = delta_content(&data)?;
            yield content;
        }
    })
}
