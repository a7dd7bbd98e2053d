//! Line-oriented reader over a streaming response body.

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::config::INITIAL_LINE_BUFFER;
use crate::error::{BoxError, Error, Result};

const DATA_PREFIX: &str = "data:";

/// Yields the payloads of `data:` lines from a byte stream.
///
/// Lines are split on `\n` regardless of how the body is chunked. Blank lines,
/// other SSE fields and non-UTF-8 lines are skipped. A line longer than
/// `max_line` bytes is an error rather than being split.
pub struct FrameReader {
    body: BoxStream<'static, std::result::Result<Bytes, BoxError>>,
    buf: Vec<u8>,
    /// Start of the first line not yet returned
    start: usize,
    /// Bytes of `buf` already searched for a newline
    scanned: usize,
    max_line: usize,
    eof: bool,
}

impl FrameReader {
    pub fn new<S, E>(body: S, max_line: usize) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            body: body.map(|chunk| chunk.map_err(Into::into)).boxed(),
            buf: Vec::with_capacity(INITIAL_LINE_BUFFER.min(max_line)),
            start: 0,
            scanned: 0,
            max_line,
            eof: false,
        }
    }

    /// Next `data:` payload, trimmed. `None` once the body is exhausted.
    pub async fn next_data(&mut self) -> Option<Result<String>> {
        loop {
            let raw = match self.next_line().await? {
                Ok(raw) => raw,
                Err(e) => return Some(Err(e)),
            };

            let Ok(text) = std::str::from_utf8(&raw) else {
                debug!(len = raw.len(), "skipping line that is not valid UTF-8");
                continue;
            };

            let line = text.trim();
            if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
                return Some(Ok(payload.trim().to_string()));
            }
        }
    }

    async fn next_line(&mut self) -> Option<Result<Vec<u8>>> {
        loop {
            if let Some(pos) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
                let end = self.scanned + pos;
                if end - self.start > self.max_line {
                    return Some(Err(Error::LineTooLong {
                        limit: self.max_line,
                    }));
                }
                let line = self.buf[self.start..end].to_vec();
                self.start = end + 1;
                self.scanned = self.start;
                return Some(Ok(line));
            }

            self.scanned = self.buf.len();
            if self.buf.len() - self.start > self.max_line {
                return Some(Err(Error::LineTooLong {
                    limit: self.max_line,
                }));
            }

            if self.eof {
                if self.start == self.buf.len() {
                    return None;
                }
                let line = self.buf[self.start..].to_vec();
                self.start = self.buf.len();
                self.scanned = self.start;
                return Some(Ok(line));
            }

            // Drop returned lines once per chunk, not once per line.
            if self.start > 0 {
                self.buf.drain(..self.start);
                self.scanned -= self.start;
                self.start = 0;
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Some(Err(Error::Read(e))),
                None => self.eof = true,
            }
        }
    }
}
