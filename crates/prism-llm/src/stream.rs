//! Streaming response bodies
//!
//! Two shapes are emitted. The raw shape forwards completion text as
//! plain chunks. The data-stream shape frames every chunk as a tagged
//! line (`f:` for the stream header, `0:` for text) for clients that
//! speak the Vercel AI data-stream protocol.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{Body, Bytes};
use axum::response::Response;
use futures_util::StreamExt;
use http::header::CONTENT_TYPE;
use tokio::sync::mpsc;

use crate::provider::EventStream;
use crate::types::StreamEvent;

const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";
const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Fences bracketing schema-constrained output in data-stream mode
const FENCE_OPEN: &str = "```json\n";
const FENCE_CLOSE: &str = "\n```";

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cheap unique identifier: hex millis plus a process-wide counter.
pub(crate) fn uuid_simple() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{millis:x}{n:04x}")
}

/// Escapes a chunk for embedding in a tag-0 line.
///
/// Only quotes and newlines are rewritten; this is the protocol's
/// escape set, not full JSON encoding.
fn escape_chunk(text: &str) -> String {
    text.replace('"', "\\\"").replace('\n', "\\n")
}

fn text_line(chunk: &str) -> String {
    format!("0:\"{}\"\n", escape_chunk(chunk))
}

/// Plain text stream: completion chunks forwarded verbatim.
///
/// An upstream failure after the first chunk surfaces as a final plain
/// chunk carrying the error text, matching the data-stream path.
pub fn raw_stream_response(events: EventStream) -> Response {
    let body = raw_chunks(events).map(Ok::<_, Infallible>);

    Response::builder()
        .header(CONTENT_TYPE, TEXT_PLAIN_UTF8)
        .body(Body::from_stream(body))
        .unwrap_or_default()
}

/// Text chunks of the raw stream, ending after the first upstream error.
fn raw_chunks(events: EventStream) -> impl futures_util::Stream<Item = Bytes> {
    events
        .scan(false, |failed, event| {
            let chunk = if *failed {
                None
            } else {
                match event {
                    Ok(StreamEvent::Delta(delta)) => delta.content.filter(|c| !c.is_empty()).map(Bytes::from),
                    Ok(StreamEvent::Usage(_) | StreamEvent::Done) => None,
                    Err(e) => {
                        tracing::warn!(error = %e, "stream failed after commit");
                        *failed = true;
                        Some(Bytes::from(e.to_string()))
                    }
                }
            };
            // A None after failure terminates the stream; a plain skipped
            // event keeps it open.
            futures_util::future::ready(if *failed && chunk.is_none() { None } else { Some(chunk) })
        })
        .filter_map(futures_util::future::ready)
}

/// Data-stream response: tagged lines with a leading message header.
///
/// When `schema_mode` is set the text chunks are bracketed by a
/// ```` ```json ```` fence so clients can recover the JSON document.
pub fn data_stream_response(events: EventStream, schema_mode: bool) -> Response {
    let (tx, rx) = mpsc::channel::<String>(32);
    tokio::spawn(pump(events, schema_mode, tx));

    let body = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (Ok::<_, Infallible>(Bytes::from(line)), rx))
    });

    Response::builder()
        .header(CONTENT_TYPE, TEXT_PLAIN_UTF8)
        .header(DATA_STREAM_HEADER, "v1")
        .body(Body::from_stream(body))
        .unwrap_or_default()
}

/// Drives the upstream event stream into framed lines.
///
/// Once the first line is written the HTTP status is committed, so a
/// failing upstream surfaces as an in-band text line rather than an
/// error response.
async fn pump(mut events: EventStream, schema_mode: bool, tx: mpsc::Sender<String>) {
    let header = format!("f:{{\"messageId\":\"msg-{}\"}}\n", uuid_simple());
    if tx.send(header).await.is_err() {
        return;
    }

    if schema_mode && tx.send(text_line(FENCE_OPEN)).await.is_err() {
        return;
    }

    while let Some(event) = events.next().await {
        match event {
            Ok(StreamEvent::Delta(delta)) => {
                if let Some(content) = delta.content
                    && !content.is_empty()
                    && tx.send(text_line(&content)).await.is_err()
                {
                    return;
                }
            }
            Ok(StreamEvent::Usage(_)) => {}
            Ok(StreamEvent::Done) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stream failed after commit");
                let _ = tx.send(text_line(&e.to_string())).await;
                break;
            }
        }
    }

    if schema_mode {
        let _ = tx.send(text_line(FENCE_CLOSE)).await;
    }
}
