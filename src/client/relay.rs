//! HTTP transport from the client to the relay endpoint.
use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use http::header;

use crate::api::public::chat::{ChatRequest, ChatResponse};
use crate::relay::ResponseMode;

use super::ClientError;
use super::decode::Utf8Decoder;
use super::session::ChatSession;

pub const CHAT_PATH: &str = "/api/v1/chat";

pub struct RelayClient {
    http: reqwest::Client,
    chat_url: String,
    mode: ResponseMode,
}

impl RelayClient {
    pub fn new(base_url: &str, mode: ResponseMode) -> Self {
        Self {
            http: reqwest::Client::new(),
            chat_url: format!("{}{}", base_url.trim_end_matches('/'), CHAT_PATH),
            mode,
        }
    }

    /// Submit `input` and drive `session` through to idle again.
    /// `on_update` is called after every state change, including each
    /// streamed chunk and the finalized transcript, so a front end can
    /// re-render. Failures never
    /// escape: they end up as a single error message in the
    /// transcript. Returns false when nothing was submitted.
    pub async fn submit<F>(&self, session: &mut ChatSession, input: &str, mut on_update: F) -> bool
    where
        F: FnMut(&ChatSession),
    {
        let Some(prompt) = session.begin_submit(input) else {
            return false;
        };
        on_update(session);

        if let Err(e) = self.exchange(session, &prompt, &mut on_update).await {
            tracing::warn!("Chat request failed: {}", e);
            session.fail();
        }
        on_update(session);

        session.settle();
        on_update(session);
        true
    }

    async fn exchange<F>(
        &self,
        session: &mut ChatSession,
        prompt: &str,
        on_update: &mut F,
    ) -> Result<(), ClientError>
    where
        F: FnMut(&ChatSession),
    {
        let accept = match self.mode {
            ResponseMode::Buffered => "application/json",
            ResponseMode::Streaming => "text/event-stream",
        };
        let request = self
            .http
            .post(&self.chat_url)
            .header(header::ACCEPT, accept)
            .json(&ChatRequest::new(prompt));

        session.mark_awaiting();
        on_update(session);

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match self.mode {
            ResponseMode::Buffered => {
                let reply: ChatResponse = response.json().await?;
                session.finish_buffered(reply);
                Ok(())
            }
            ResponseMode::Streaming => {
                consume_stream(session, response.bytes_stream(), on_update).await
            }
        }
    }
}

/// Read a streamed reply to the end, appending decoded text to the
/// in-flight buffer as it arrives and finalizing it once the stream is
/// exhausted. A read error stops consumption and is returned as is.
pub async fn consume_stream<S, E, F>(
    session: &mut ChatSession,
    stream: S,
    on_update: &mut F,
) -> Result<(), ClientError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<ClientError>,
    F: FnMut(&ChatSession),
{
    session.begin_stream();
    on_update(session);

    let mut stream = Box::pin(stream);
    let mut decoder = Utf8Decoder::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::into)?;
        let text = decoder.decode(&chunk);
        if !text.is_empty() {
            session.append_chunk(&text);
            on_update(session);
        }
    }

    let rest = decoder.finish();
    if !rest.is_empty() {
        session.append_chunk(&rest);
    }

    session.finish_stream()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    use crate::client::session::{ERROR_MESSAGE, Phase};

    fn ok_chunks(chunks: Vec<&[u8]>) -> Vec<Result<Bytes, ClientError>> {
        chunks
            .into_iter()
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect()
    }

    #[tokio::test]
    async fn test_consume_stream_reconstructs_reply() {
        let mut session = ChatSession::new();
        session.begin_submit("Hello");

        let mut partials = Vec::new();
        let mut on_update = |s: &ChatSession| {
            if let Some(text) = s.in_flight() {
                partials.push(text.to_string());
            }
        };

        let chunks = stream::iter(ok_chunks(vec![
            "Hi".as_bytes(),
            " there".as_bytes(),
            "!".as_bytes(),
        ]));
        consume_stream(&mut session, chunks, &mut on_update)
            .await
            .unwrap();

        assert_eq!(partials, vec!["", "Hi", "Hi there", "Hi there!"]);
        assert_eq!(session.transcript().last().unwrap().content, "Hi there!");
    }

    #[tokio::test]
    async fn test_consume_stream_split_utf8() {
        let mut session = ChatSession::new();
        session.begin_submit("Hello");

        let bytes = "¡hola!".as_bytes();
        let chunks = stream::iter(ok_chunks(vec![&bytes[..1], &bytes[1..]]));
        consume_stream(&mut session, chunks, &mut |_: &ChatSession| {})
            .await
            .unwrap();

        assert_eq!(session.transcript().last().unwrap().content, "¡hola!");
    }

    #[tokio::test]
    async fn test_read_error_mid_stream() {
        let mut session = ChatSession::new();
        session.begin_submit("Hello");

        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"Hi")),
            Err(ClientError::Relay("connection dropped".to_string())),
            Ok(Bytes::from_static(b"never read")),
        ]);
        let result = consume_stream(&mut session, chunks, &mut |_: &ChatSession| {}).await;
        assert!(result.is_err());

        // The caller converts the failure into the error message
        session.fail();
        session.settle();
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript().last().unwrap().content, ERROR_MESSAGE);
        assert!(!session.is_loading());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_submit_blank_input_is_noop() {
        let client = RelayClient::new("http://127.0.0.1:9", ResponseMode::Streaming);
        let mut session = ChatSession::new();
        let mut updates = 0;

        let submitted = client.submit(&mut session, "   ", |_| updates += 1).await;

        assert!(!submitted);
        assert_eq!(updates, 0);
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_submit_unreachable_relay() {
        // Nothing listens on the discard port
        let client = RelayClient::new("http://127.0.0.1:9", ResponseMode::Streaming);
        let mut session = ChatSession::new();
        let mut saw_loading = false;
        let mut phases = Vec::new();

        let submitted = client
            .submit(&mut session, "Hello", |s| {
                saw_loading |= s.is_loading();
                phases.push(s.phase());
            })
            .await;

        assert!(submitted);
        assert!(saw_loading);
        assert_eq!(
            phases,
            vec![
                Phase::Submitting,
                Phase::Awaiting,
                Phase::Finalizing,
                Phase::Idle
            ]
        );
        assert!(!session.is_loading());
        let contents: Vec<&str> = session
            .transcript()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["Hello", ERROR_MESSAGE]);
    }

    #[tokio::test]
    async fn test_submit_streaming_against_mock_relay() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", CHAT_PATH)
            .match_header("accept", "text/event-stream")
            .match_body(mockito::Matcher::Json(serde_json::json!({"prompt": "Hello"})))
            .with_status(200)
            .with_header("content-type", "text/event-stream; charset=utf-8")
            .with_body("Hi there!")
            .create_async()
            .await;

        let client = RelayClient::new(&server.url(), ResponseMode::Streaming);
        let mut session = ChatSession::new();
        client.submit(&mut session, "Hello", |_| {}).await;

        mock.assert_async().await;
        assert_eq!(session.transcript().last().unwrap().content, "Hi there!");
    }

    #[tokio::test]
    async fn test_submit_buffered_against_mock_relay() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", CHAT_PATH)
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"thinking":"4","response":"The answer is 4"}"#)
            .create_async()
            .await;

        let client = RelayClient::new(&server.url(), ResponseMode::Buffered);
        let mut session = ChatSession::new();
        client.submit(&mut session, "2+2", |_| {}).await;

        mock.assert_async().await;
        let contents: Vec<&str> = session
            .transcript()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["2+2", "🤔 Thinking: 4", "🗣️ The answer is 4"]);
    }

    #[tokio::test]
    async fn test_submit_buffered_bad_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", CHAT_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let client = RelayClient::new(&server.url(), ResponseMode::Buffered);
        let mut session = ChatSession::new();
        client.submit(&mut session, "2+2", |_| {}).await;

        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript().last().unwrap().content, ERROR_MESSAGE);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_submit_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", CHAT_PATH)
            .with_status(500)
            .with_body("Something went wrong: boom")
            .create_async()
            .await;

        let client = RelayClient::new(&server.url(), ResponseMode::Streaming);
        let mut session = ChatSession::new();
        client.submit(&mut session, "Hello", |_| {}).await;

        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript().last().unwrap().content, ERROR_MESSAGE);
    }
}
