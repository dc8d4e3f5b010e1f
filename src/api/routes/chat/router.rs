//! Router for the chat API

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::post,
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::AppConfig;
use crate::openai::{completion, completion_stream};
use crate::relay::{ResponseMode, relay_body, split_reasoning};

type SharedState = Arc<AppState>;

/// Forward a single prompt upstream and reply buffered or streamed
/// depending on the `Accept` header
async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<Response, ApiError> {
    if payload.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt must not be empty"));
    }

    let AppConfig {
        api_base_url,
        api_key,
        model,
    } = &state.config;

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    let mode = ResponseMode::from_accept(accept);
    tracing::debug!("Relaying prompt to {} ({:?})", model, mode);

    match mode {
        ResponseMode::Buffered => {
            let raw = completion(&payload.prompt, api_base_url, api_key, model).await?;
            let reply = split_reasoning(&raw);
            Ok(axum::Json(reply).into_response())
        }
        ResponseMode::Streaming => {
            let deltas = completion_stream(&payload.prompt, api_base_url, api_key, model).await?;
            let body = Body::from_stream(relay_body(deltas));
            let mut resp = body.into_response();
            let resp_headers = resp.headers_mut();
            resp_headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/event-stream; charset=utf-8"),
            );
            resp_headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-transform"),
            );
            resp_headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
            Ok(resp)
        }
    }
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/chat", post(chat_handler))
}
