//! Newline-delimited JSON bodies for the streaming routes

use crate::error::{Error, Result};
use axum::body::{Body, Bytes};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::BytesMut;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;

/// Content type of streaming request and response bodies
pub const CONTENT_TYPE: &str = "application/x-ndjson";

struct LineReader {
    chunks: BoxStream<'static, std::result::Result<Bytes, axum::Error>>,
    buffer: BytesMut,
    finished: bool,
}

impl LineReader {
    fn next_line(&mut self) -> Option<Bytes> {
        let end = self.buffer.iter().position(|b| *b == b'\n')?;
        let line = self.buffer.split_to(end + 1).freeze();
        Some(line.slice(..end))
    }

    fn remainder(&mut self) -> Option<Bytes> {
        (!self.buffer.is_empty()).then(|| self.buffer.split().freeze())
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

/// Decode a request body into one item per non-blank line
///
/// A line that does not parse yields an error item; a broken body yields
/// one error and ends the stream.
pub fn decode_lines<T>(body: Body) -> BoxStream<'static, Result<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let reader = LineReader {
        chunks: body.into_data_stream().boxed(),
        buffer: BytesMut::new(),
        finished: false,
    };

    stream::unfold(reader, |mut reader| async move {
        loop {
            let line = match reader.next_line() {
                Some(line) => Some(line),
                None if reader.finished => match reader.remainder() {
                    Some(rest) => Some(rest),
                    None => return None,
                },
                None => None,
            };

            if let Some(line) = line {
                if is_blank(&line) {
                    continue;
                }
                let item = serde_json::from_slice::<T>(&line).map_err(Error::from);
                return Some((item, reader));
            }

            match reader.chunks.next().await {
                Some(Ok(chunk)) => reader.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    reader.finished = true;
                    reader.buffer.clear();
                    let err = Error::Other(format!("Failed to read request body: {e}"));
                    return Some((Err(err), reader));
                }
                None => reader.finished = true,
            }
        }
    })
    .boxed()
}

/// One encoded line
pub fn encode_line<T: Serialize>(item: &T) -> Bytes {
    match serde_json::to_vec(item) {
        Ok(mut line) => {
            line.push(b'\n');
            Bytes::from(line)
        }
        Err(e) => error_line(&Error::from(e)),
    }
}

/// Final line reporting a failure in the middle of a stream
pub fn error_line(err: &Error) -> Bytes {
    let mut line = json!({ "error": err.to_string() }).to_string().into_bytes();
    line.push(b'\n');
    Bytes::from(line)
}

/// Encode a fallible stream; the first error is written as a final line
pub fn encode_stream<T, S>(items: S) -> Body
where
    T: Serialize + Send + 'static,
    S: Stream<Item = Result<T>> + Send + 'static,
{
    let lines = items
        .scan(false, |failed, item| {
            let line = if *failed {
                None
            } else {
                match item {
                    Ok(item) => Some(encode_line(&item)),
                    Err(e) => {
                        tracing::error!("Stream failed: {e}");
                        *failed = true;
                        Some(error_line(&e))
                    }
                }
            };
            futures::future::ready(line)
        })
        .map(Ok::<_, Infallible>);

    Body::from_stream(lines)
}

/// Streaming response with the NDJSON content type
pub fn response(body: Body) -> Response {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}
