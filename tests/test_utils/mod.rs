//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::{Router, body::Body};

use relaychat::api::AppState;
use relaychat::api::app;
use relaychat::core::AppConfig;

/// Creates a test application router that relays to `upstream_url`,
/// usually a `mockito` server standing in for the completion API.
pub fn test_app(upstream_url: &str) -> Router {
    let app_config = AppConfig::new(upstream_url, "test-api-key");
    let app_state = AppState::new(app_config);
    app(Arc::new(app_state))
}

/// Serves the test application on an ephemeral port and returns its
/// base URL.
pub async fn spawn_test_app(upstream_url: &str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    let app = test_app(upstream_url);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// An upstream SSE body with one chunk per delta followed by `[DONE]`.
/// The last delta carries `finish_reason: "stop"`.
pub fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::new();
    for (i, delta) in deltas.iter().enumerate() {
        let finish_reason = if i + 1 == deltas.len() {
            serde_json::json!("stop")
        } else {
            serde_json::Value::Null
        };
        let chunk = serde_json::json!({
            "id": format!("chatcmpl-{}", i),
            "object": "chat.completion.chunk",
            "created": 1694268190,
            "model": "llama3-8b-8192",
            "choices": [{
                "index": 0,
                "delta": {"content": delta},
                "finish_reason": finish_reason
            }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

/// A buffered upstream completion whose message content is `content`.
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1694268190,
        "model": "llama3-8b-8192",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
