use std::convert::Infallible;

use anyhow::Error;
use async_stream::stream;
use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;

use crate::api::public::chat::error_frame;

/// Re-emit upstream deltas as raw UTF-8 body chunks, one per delta and
/// in the order received. Empty deltas are skipped. If the upstream
/// fails part way through, an error frame is written and the body ends.
pub fn relay_body<S>(deltas: S) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static
where
    S: Stream<Item = Result<String, Error>> + Send + 'static,
{
    stream! {
        let mut deltas = Box::pin(deltas);
        let mut relayed = 0usize;

        while let Some(delta) = deltas.next().await {
            match delta {
                Ok(text) if text.is_empty() => continue,
                Ok(text) => {
                    relayed += text.len();
                    yield Ok(Bytes::from(text));
                }
                Err(e) => {
                    tracing::error!("Relay stream failed after {} bytes: {}", relayed, e);
                    yield Ok(Bytes::from(error_frame(&e.to_string())));
                    break;
                }
            }
        }

        tracing::debug!("Relay stream closed after {} bytes", relayed);
    }
}
