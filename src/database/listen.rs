use super::DatabaseError;
use crate::core::parse_error_response;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream};
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::Value;
use std::pin::Pin;
use std::task::{Context, Poll};
use url::Url;

/// Payload of `put` and `patch` events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventData {
    /// Path relative to the listened location, `/` for the location itself.
    pub path: String,
    pub data: Value,
}

/// A server-sent event from the database's streaming endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Replace the value at `path`; `null` deletes it.
    Put(EventData),
    /// Merge each child of `data` into the value at `path`.
    Patch(EventData),
    KeepAlive,
    /// The server stopped the stream, usually because rules no longer allow the read.
    Cancel(Option<String>),
    /// The credential expired; the stream must be reopened with a fresh token.
    AuthRevoked,
}

/// A stream of `StreamEvent` messages.
pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: BytesMut,
    /// Bytes of `buffer` already searched for a frame separator.
    scanned: usize,
}

impl EventStream {
    pub fn new(inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>) -> Self {
        Self {
            inner,
            buffer: BytesMut::new(),
            scanned: 0,
        }
    }
}

impl Stream for EventStream {
    type Item = Result<StreamEvent, DatabaseError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let from = self.scanned;
            if let Some((frame_len, sep_len)) = find_frame_boundary(&self.buffer, from) {
                let bytes = self.buffer.split_to(frame_len + sep_len);
                self.scanned = 0;
                let frame = String::from_utf8_lossy(&bytes[..frame_len]).into_owned();
                match parse_frame(&frame) {
                    Ok(Some(event)) => return Poll::Ready(Some(Ok(event))),
                    // Comments and unknown event types.
                    Ok(None) => continue,
                    Err(e) => return Poll::Ready(Some(Err(e))),
                }
            }
            // A separator can straddle two chunks, so rescan its last bytes.
            self.scanned = self.buffer.len().saturating_sub(3);

            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    self.buffer.extend_from_slice(&chunk);
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(DatabaseError::RequestError(e))));
                }
                Poll::Ready(None) => {
                    if self.buffer.iter().all(|b| b.is_ascii_whitespace()) {
                        return Poll::Ready(None);
                    }
                    // A final frame without the trailing blank line.
                    let rest = self.buffer.split();
                    let frame = String::from_utf8_lossy(&rest).into_owned();
                    return match parse_frame(&frame) {
                        Ok(Some(event)) => Poll::Ready(Some(Ok(event))),
                        Ok(None) => Poll::Ready(None),
                        Err(e) => Poll::Ready(Some(Err(e))),
                    };
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Finds the end of the first event frame, searching from `from`. Returns the
/// frame length and the length of the blank-line separator that follows it.
fn find_frame_boundary(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i < buf.len() {
        if buf[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
        if buf[i..].starts_with(b"\n\n") {
            return Some((i, 2));
        }
        i += 1;
    }
    None
}

fn parse_frame(frame: &str) -> Result<Option<StreamEvent>, DatabaseError> {
    let mut event_type = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in frame.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event_type = Some(value),
            "data" => data_lines.push(value),
            _ => {}
        }
    }

    let data = data_lines.join("\n");
    let event = match event_type {
        Some("put") => StreamEvent::Put(serde_json::from_str(&data)?),
        Some("patch") => StreamEvent::Patch(serde_json::from_str(&data)?),
        Some("keep-alive") => StreamEvent::KeepAlive,
        Some("cancel") => {
            let reason = match serde_json::from_str::<Value>(&data) {
                Ok(Value::String(s)) => Some(s),
                Ok(Value::Null) => None,
                _ if data.trim().is_empty() => None,
                _ => Some(data.trim().to_string()),
            };
            StreamEvent::Cancel(reason)
        }
        Some("auth_revoked") => StreamEvent::AuthRevoked,
        _ => return Ok(None),
    };
    Ok(Some(event))
}

pub(crate) async fn listen_request(
    client: &ClientWithMiddleware,
    url: Url,
    query: &[(&str, String)],
) -> Result<EventStream, DatabaseError> {
    let response = client
        .get(url)
        .query(query)
        .header(header::ACCEPT, "text/event-stream")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(DatabaseError::ApiError(
            parse_error_response(response, "Listen failed").await,
        ));
    }

    let stream = stream::unfold(response, |mut resp| async move {
        match resp.chunk().await {
            Ok(Some(bytes)) => Some((Ok(bytes), resp)),
            Ok(None) => None,
            Err(e) => Some((Err(e), resp)),
        }
    });

    Ok(EventStream::new(Box::pin(stream)))
}
